//! The [`Serializer`] and the save, load and clone sessions it drives.
//!
//! Saving runs in two phases. Discovery walks the graph breadth first from
//! the root and assigns every reachable object an index inside the repo of
//! its runtime type. Emission then encodes each object into its repo's data
//! section. Because every object has an index before anything is written,
//! cycles and shared references need no special casing.
//!
//! Loading mirrors this: an object's shell is allocated and recorded on first
//! request, and its members are filled from a queue afterwards.

// -----------------------------------------------------------------------------
// Modules

mod clone;
mod load;
mod object_ref;
mod save;
mod table;

// -----------------------------------------------------------------------------
// Exports

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::io::{Read, Write};

use sg_reflect::heap::{HeapError, ObjectData, Slot, TypeRef};
use sg_reflect::{FromValue, Heap, ObjRef, TypeRegistry, Value};
use sg_utils::hash::HashSet;

use crate::header::Header;
use crate::repo::RepoCreators;
use crate::schema::Privacy;
use crate::{Error, Result, SerializerOptions};

use clone::Cloner;
use load::{LoadSession, Loader};
use save::SaveSession;
use table::{RepoContext, runtime_type};

// -----------------------------------------------------------------------------
// Serializer

/// Saves, loads and clones object graphs against one [`TypeRegistry`].
///
/// A serializer is not meant to be shared between threads while in use.
/// The most recent load is kept as the session that lazy members of that
/// load resolve against, see [`Serializer::resolve_member`].
pub struct Serializer<'r> {
    registry: &'r TypeRegistry,
    creators: Arc<RepoCreators>,
    options: SerializerOptions,
    session: Option<LoadSession>,
}

impl<'r> Serializer<'r> {
    /// Creates a serializer with the default options and builtin creators.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_options(registry, SerializerOptions::default())
    }

    pub fn with_options(registry: &'r TypeRegistry, options: SerializerOptions) -> Self {
        Self::with_creators(registry, Arc::new(RepoCreators::new()), options)
    }

    /// Creates a serializer that picks shapes with `creators`.
    pub fn with_creators(
        registry: &'r TypeRegistry,
        creators: Arc<RepoCreators>,
        options: SerializerOptions,
    ) -> Self {
        Self {
            registry,
            creators,
            options,
            session: None,
        }
    }

    #[inline]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    #[inline]
    pub fn options_mut(&mut self) -> &mut SerializerOptions {
        &mut self.options
    }

    /// The header of the most recent load, while its session is alive.
    pub fn last_header(&self) -> Option<&Header> {
        self.session.as_ref().map(|session| &session.header)
    }

    /// Drops the session of the most recent load.
    ///
    /// Lazy members still unresolved afterwards can only read as their default.
    pub fn release_session(&mut self) {
        self.session = None;
    }

    fn context(&self) -> RepoContext<'_> {
        RepoContext {
            registry: self.registry,
            creators: &self.creators,
            privacy: Privacy::new(self.registry, self.options.public_only),
        }
    }

    // -------------------------------------------------------------------------
    // Save

    /// Writes the graph reachable from `root`.
    ///
    /// Objects that fail to encode are logged and written empty, so they
    /// load with default members. Stream failures abort the save.
    ///
    /// # Errors
    ///
    /// [`Error::Deferred`] if a reachable member of a lazy load is still
    /// unresolved, see [`Serializer::resolve_all`].
    pub fn save<W: Write>(&self, heap: &Heap, root: &Value, writer: &mut W) -> Result<()> {
        let mut session = SaveSession::new(self.context(), heap);
        session.discover(root)?;
        let sections = session.emit()?;
        session.write(writer, &self.options.name, root, &sections)?;
        writer.flush()?;
        Ok(())
    }

    /// Like [`Serializer::save`], into a new buffer.
    pub fn save_to_vec(&self, heap: &Heap, root: &Value) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save(heap, root, &mut buf)?;
        Ok(buf)
    }

    // -------------------------------------------------------------------------
    // Load

    /// Reads a graph into `heap` and returns its root.
    ///
    /// Lazy members are deferred if [`SerializerOptions::lazy`] is set.
    pub fn load<R: Read>(&mut self, heap: &mut Heap, reader: &mut R) -> Result<Value> {
        self.load_with(heap, reader, self.options.lazy)
    }

    /// Reads a graph, deferring every virtual property until
    /// [`Serializer::resolve_member`] asks for it.
    pub fn load_lazy<R: Read>(&mut self, heap: &mut Heap, reader: &mut R) -> Result<Value> {
        self.load_with(heap, reader, true)
    }

    /// Reads a graph and converts its root to `T`.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if the root does not convert.
    pub fn load_as<T: FromValue, R: Read>(&mut self, heap: &mut Heap, reader: &mut R) -> Result<T> {
        let root = self.load(heap, reader)?;
        T::from_value(&root).ok_or_else(|| Error::TypeMismatch {
            declared: core::any::type_name::<T>().into(),
            found: self.describe(heap, &root),
        })
    }

    fn load_with<R: Read>(&mut self, heap: &mut Heap, reader: &mut R, lazy: bool) -> Result<Value> {
        self.session = None;
        let (mut session, root) = LoadSession::read(reader, &self.context(), lazy)?;
        let mut loader = Loader::new(self.registry, heap, &mut session);
        let root = loader.root(root)?;
        loader.process_load_queue();
        log::debug!(
            "loaded `{}`: {} types, session {}",
            session.header.name,
            session.repos.len(),
            session.id
        );
        self.session = Some(session);
        Ok(root)
    }

    /// Materializes member `name` of `obj` if it is still deferred.
    ///
    /// Members that are not lazy are returned as they are. Deferred members
    /// whose bytes were skipped read as their default.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if the member belongs to a load other than
    /// the most recent one, or the session was released.
    pub fn resolve_member(&mut self, heap: &mut Heap, obj: ObjRef, name: &str) -> Result<Value> {
        let target = match heap.slot(self.registry, obj, name)? {
            Slot::Loaded(value) => return Ok(value.clone()),
            Slot::Unloaded(None) => return Ok(heap.member(self.registry, obj, name)?),
            Slot::Unloaded(Some(target)) => *target,
        };
        let value = self.load_deferred(heap, target)?;
        heap.set_member(self.registry, obj, name, value.clone())?;
        Ok(value)
    }

    /// Materializes every deferred member reachable from `root` and returns
    /// how many were resolved.
    ///
    /// [`Serializer::clone`] and [`Serializer::clone_direct`] run this first.
    /// [`Serializer::save`] refuses graphs that still hold deferred members.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if a reachable member belongs to a load
    /// other than the most recent one, or the session was released.
    pub fn resolve_all(&mut self, heap: &mut Heap, root: &Value) -> Result<usize> {
        let mut resolved = 0;
        let mut visited: HashSet<ObjRef> = HashSet::default();
        let mut stack: Vec<ObjRef> = root.as_obj().into_iter().collect();
        while let Some(obj) = stack.pop() {
            if !visited.insert(obj) {
                continue;
            }
            let pending: Vec<(usize, TypeRef)> = match heap.get(obj)?.data() {
                ObjectData::Fields(slots) => slots
                    .iter()
                    .enumerate()
                    .filter_map(|(i, slot)| match slot {
                        Slot::Unloaded(Some(target)) => Some((i, *target)),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            for (slot, target) in pending {
                let value = self.load_deferred(heap, target)?;
                heap.set_slot(obj, slot, Slot::Loaded(value))?;
                resolved += 1;
            }

            match heap.get(obj)?.data() {
                ObjectData::Fields(slots) => stack.extend(slots.iter().filter_map(|slot| match slot {
                    Slot::Loaded(value) => value.as_obj(),
                    Slot::Unloaded(_) => None,
                })),
                ObjectData::Array(values) | ObjectData::List(values) => {
                    stack.extend(values.iter().filter_map(Value::as_obj));
                }
                ObjectData::Map(map) => stack.extend(
                    map.iter()
                        .flat_map(|(k, v)| [k.as_obj(), v.as_obj()])
                        .flatten(),
                ),
                ObjectData::Set(set) => stack.extend(set.iter().filter_map(Value::as_obj)),
                ObjectData::Bytes(_) => {}
            }
        }
        if resolved > 0 {
            log::debug!("resolved {resolved} deferred members");
        }
        Ok(resolved)
    }

    fn load_deferred(&mut self, heap: &mut Heap, target: TypeRef) -> Result<Value> {
        let session = self
            .session
            .as_mut()
            .filter(|session| session.id == target.session)
            .ok_or(Error::NoActiveSession)?;

        let mut loader = Loader::new(self.registry, heap, session);
        let value = loader.load_object(target.type_index, target.index)?;
        loader.process_load_queue();
        Ok(value)
    }

    // -------------------------------------------------------------------------
    // Clone

    /// Deep copies the graph below `root` by saving it to memory and loading
    /// it back, with lazy loading off.
    ///
    /// Deferred members are resolved first, see [`Serializer::resolve_all`].
    pub fn clone(&mut self, heap: &mut Heap, root: &Value) -> Result<Value> {
        self.resolve_all(heap, root)?;
        let bytes = self.save_to_vec(heap, root)?;
        let session = self.session.take();
        let copy = self.load_with(heap, &mut bytes.as_slice(), false);
        self.session = session;
        copy
    }

    /// Deep copies the graph below `root` directly, repo by repo.
    ///
    /// Follows the same privacy and drift rules as [`Serializer::clone`]
    /// without encoding anything.
    ///
    /// # Errors
    ///
    /// [`Error::NotCloneable`] if `root` is a value rather than an object.
    /// [`Error::NoActiveSession`] if a deferred member cannot be resolved.
    pub fn clone_direct(&mut self, heap: &mut Heap, root: &Value) -> Result<Value> {
        self.resolve_all(heap, root)?;
        Cloner::new(self.context(), heap).clone_root(root)
    }

    fn describe(&self, heap: &Heap, value: &Value) -> String {
        match runtime_type(heap, value) {
            Ok(Some(key)) => self
                .registry
                .get(key)
                .map_or_else(|| alloc::format!("{key}"), |entry| entry.path().into()),
            Ok(None) => "null".into(),
            Err(HeapError::InvalidRef(obj)) => alloc::format!("dangling {obj}"),
            Err(e) => alloc::format!("{e}"),
        }
    }
}
