use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use sg_utils::hash::{HashMap, HashSet};

use crate::info::{MemberInfo, ObjectInfo, PrimitiveKind, TypeInfo, TypeShape, short_name};
use crate::registry::{RegistryError, TypeKey};
use crate::value::{EnumValue, Value};

// -----------------------------------------------------------------------------
// TypeEntry

/// A registered type: its [`TypeInfo`] plus data resolved at registration.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    key: TypeKey,
    info: TypeInfo,
    base: Option<TypeKey>,
    // Base members first, then own members.
    members: Arc<[MemberInfo]>,
}

impl TypeEntry {
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    #[inline]
    pub fn path(&self) -> &str {
        self.info.path()
    }

    #[inline]
    pub fn base(&self) -> Option<TypeKey> {
        self.base
    }

    /// The flattened member list, base members first.
    ///
    /// Empty for every shape other than `Object`.
    #[inline]
    pub fn members(&self) -> &Arc<[MemberInfo]> {
        &self.members
    }

    /// The object info, for object types.
    #[inline]
    pub fn object_info(&self) -> Option<&ObjectInfo> {
        self.info.as_object().ok()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of runtime types.
///
/// This struct is the central store for type information. It is built once
/// and shared by reference with every serializer session.
///
/// [`TypeRegistry::new`] pre-registers the built-in types under fixed
/// [`TypeKey`]s: `object`, the primitives, `string`, `DateTime`,
/// `DateTimeOffset`, `TimeSpan`, `TimeZoneInfo`, `Version`, `Type` and `u8[]`.
///
/// # Example
///
/// ```
/// use sg_reflect::info::{MemberInfo, ObjectInfo, TypeInfo};
/// use sg_reflect::registry::{TypeKey, TypeRegistry};
///
/// let mut registry = TypeRegistry::new();
/// let node = registry
///     .register(TypeInfo::object(
///         "app::Node",
///         ObjectInfo::new().with_member(MemberInfo::field("next", "app::Node")),
///     ))
///     .unwrap();
/// let list = registry.list_of("app::Node").unwrap();
///
/// assert_eq!(registry.key_of("app::Node"), Some(node));
/// assert_eq!(registry.get(list).unwrap().path(), "List<app::Node>");
/// assert!(registry.is_assignable(node, TypeKey::OBJECT));
/// ```
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    path_to_key: HashMap<Arc<str>, TypeKey>,
    name_to_key: HashMap<Arc<str>, TypeKey>,
    ambiguous_names: HashSet<Arc<str>>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(TypeEntry::path))
            .finish()
    }
}

impl TypeRegistry {
    /// Create a type registry holding the built-in types.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            path_to_key: HashMap::default(),
            name_to_key: HashMap::default(),
            ambiguous_names: HashSet::default(),
        };

        let builtins = [
            TypeInfo::object("object", ObjectInfo::new()).public(),
        ]
        .into_iter()
        .chain(
            PrimitiveKind::ALL
                .into_iter()
                .map(|kind| TypeInfo::new(kind.name(), TypeShape::Primitive(kind))),
        )
        .chain([
            TypeInfo::new("string", TypeShape::String),
            TypeInfo::new("DateTime", TypeShape::DateTime),
            TypeInfo::new("DateTimeOffset", TypeShape::DateTimeOffset),
            TypeInfo::new("TimeSpan", TypeShape::TimeSpan),
            TypeInfo::new("TimeZoneInfo", TypeShape::TimeZone),
            TypeInfo::new("Version", TypeShape::Version),
            TypeInfo::new("Type", TypeShape::Type),
            TypeInfo::new("u8[]", TypeShape::Array { elem: "u8".into() }),
        ]);

        for info in builtins {
            // Built-in paths are distinct and carry no base type.
            let _ = registry.register(info);
        }
        debug_assert_eq!(registry.entries.len() as u32, TypeKey::BUILTIN_COUNT);
        registry
    }

    fn add_new_type_indices(&mut self, key: TypeKey) {
        let path = self.entries[key.index()].info.path_arc().clone();
        let name: Arc<str> = short_name(&path).into();

        if !self.ambiguous_names.contains(&name) {
            if self.name_to_key.contains_key(&name) {
                self.name_to_key.remove(&name);
                self.ambiguous_names.insert(name);
            } else {
                self.name_to_key.insert(name, key);
            }
        }

        self.path_to_key.insert(path, key);
    }

    /// Registers a new type and returns its key.
    ///
    /// Object types must name an already registered object type as base.
    /// Member and element types are referenced by path and may be registered later.
    pub fn register(&mut self, info: TypeInfo) -> Result<TypeKey, RegistryError> {
        if self.path_to_key.contains_key(info.path()) {
            return Err(RegistryError::DuplicatePath(info.path().into()));
        }
        let index = u32::try_from(self.entries.len()).map_err(|_| RegistryError::Overflow)?;
        let key = TypeKey::new(index);

        let (base, members) = match info.as_object() {
            Ok(object) => self.flatten_members(info.path(), object)?,
            Err(_) => (None, Arc::from(Vec::new())),
        };

        self.entries.push(TypeEntry {
            key,
            info,
            base,
            members,
        });
        self.add_new_type_indices(key);
        Ok(key)
    }

    fn flatten_members(
        &self,
        path: &str,
        object: &ObjectInfo,
    ) -> Result<(Option<TypeKey>, Arc<[MemberInfo]>), RegistryError> {
        let Some(base_path) = object.base() else {
            return Ok((None, object.members().into()));
        };

        let Some(base) = self.get_with_type_path(base_path) else {
            return Err(RegistryError::UnknownBase {
                ty: path.into(),
                base: base_path.into(),
            });
        };
        if base.object_info().is_none() {
            return Err(RegistryError::BaseNotObject {
                ty: path.into(),
                base: base_path.into(),
            });
        }

        let members: Vec<MemberInfo> = base
            .members()
            .iter()
            .chain(object.members())
            .cloned()
            .collect();
        Ok((Some(base.key()), members.into()))
    }

    // Registers a generic instantiation on first use.
    fn instance_of(&mut self, path: String, shape: TypeShape) -> Result<TypeKey, RegistryError> {
        match self.key_of(&path) {
            Some(key) => Ok(key),
            None => self.register(TypeInfo::new(path, shape)),
        }
    }

    /// Returns the key of `"{elem}[]"`, registering it if needed.
    pub fn array_of(&mut self, elem: &str) -> Result<TypeKey, RegistryError> {
        self.instance_of(format!("{elem}[]"), TypeShape::Array { elem: elem.into() })
    }

    /// Returns the key of `"List<{elem}>"`, registering it if needed.
    pub fn list_of(&mut self, elem: &str) -> Result<TypeKey, RegistryError> {
        self.instance_of(format!("List<{elem}>"), TypeShape::List { elem: elem.into() })
    }

    /// Returns the key of `"Dictionary<{key}, {value}>"`, registering it if needed.
    pub fn map_of(&mut self, key: &str, value: &str) -> Result<TypeKey, RegistryError> {
        self.instance_of(
            format!("Dictionary<{key}, {value}>"),
            TypeShape::Map {
                key: key.into(),
                value: value.into(),
            },
        )
    }

    /// Returns the key of `"HashSet<{elem}>"`, registering it if needed.
    pub fn set_of(&mut self, elem: &str) -> Result<TypeKey, RegistryError> {
        self.instance_of(format!("HashSet<{elem}>"), TypeShape::Set { elem: elem.into() })
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the entry of the type with the given key.
    #[inline]
    pub fn get(&self, key: TypeKey) -> Option<&TypeEntry> {
        self.entries.get(key.index())
    }

    /// Returns the key registered under the exact `path`.
    #[inline]
    pub fn key_of(&self, path: &str) -> Option<TypeKey> {
        self.path_to_key.get(path).copied()
    }

    /// Returns the entry registered under the exact `path`.
    pub fn get_with_type_path(&self, path: &str) -> Option<&TypeEntry> {
        match self.path_to_key.get(path) {
            Some(key) => self.get(*key),
            None => None,
        }
    }

    /// Returns the entry whose short name is `name`, unless the name is ambiguous.
    pub fn get_with_type_name(&self, name: &str) -> Option<&TypeEntry> {
        match self.name_to_key.get(name) {
            Some(key) => self.get(*key),
            None => None,
        }
    }

    /// Returns `true` if the given short name matches several registered types.
    #[inline]
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.ambiguous_names.contains(name)
    }

    /// Resolves a stored type path, tolerating qualification and module moves.
    ///
    /// 1. the exact path;
    /// 2. the path cut at its first top-level comma (drops `", Assembly, Version=.."`);
    /// 3. the unambiguous short name of that path.
    ///
    /// # Examples
    ///
    /// ```
    /// use sg_reflect::registry::{TypeKey, TypeRegistry};
    ///
    /// let registry = TypeRegistry::new();
    /// assert_eq!(registry.resolve_lenient("Version, core, Version=4.0.0.0"), Some(TypeKey::VERSION));
    /// assert_eq!(registry.resolve_lenient("old::module::string"), Some(TypeKey::STRING));
    /// assert_eq!(registry.resolve_lenient("Missing"), None);
    /// ```
    pub fn resolve_lenient(&self, path: &str) -> Option<TypeKey> {
        if let Some(key) = self.key_of(path) {
            return Some(key);
        }
        let bare = strip_qualification(path);
        if let Some(key) = self.key_of(bare) {
            return Some(key);
        }
        self.name_to_key.get(short_name(bare)).copied()
    }

    /// Returns `true` if a value of type `from` can be stored where `to` is declared.
    pub fn is_assignable(&self, from: TypeKey, to: TypeKey) -> bool {
        if from == to || to == TypeKey::OBJECT {
            return true;
        }
        let mut current = self.get(from).and_then(TypeEntry::base);
        while let Some(key) = current {
            if key == to {
                return true;
            }
            current = self.get(key).and_then(TypeEntry::base);
        }
        false
    }

    /// Returns `true` if values of a different runtime type may appear where `key` is declared.
    pub fn may_have_subtypes(&self, key: TypeKey) -> bool {
        if key == TypeKey::OBJECT {
            return true;
        }
        self.get(key)
            .and_then(TypeEntry::object_info)
            .is_some_and(|object| !object.is_sealed())
    }

    /// Returns the index of the member `name` in the flattened member list of `key`.
    ///
    /// Derived members shadow base members with the same name.
    pub fn member_index(&self, key: TypeKey, name: &str) -> Option<usize> {
        self.get(key)?
            .members()
            .iter()
            .rposition(|member| member.name() == name)
    }

    /// The value a freshly constructed owner holds in `member`.
    ///
    /// An explicit default wins, nullable members default to `null`, primitives
    /// to zero, enums to the zero constant and everything else to `null`.
    pub fn member_default(&self, member: &MemberInfo) -> Value {
        if let Some(value) = member.explicit_default() {
            return value.clone();
        }
        if member.is_nullable() {
            return Value::Null;
        }
        match self.get_with_type_path(member.type_path()) {
            Some(entry) => match entry.info().shape() {
                TypeShape::Primitive(kind) => kind.default_value(),
                TypeShape::Enum(_) => Value::Enum(EnumValue {
                    ty: entry.key(),
                    value: 0,
                }),
                _ => Value::Null,
            },
            None => Value::Null,
        }
    }

    /// Returns an iterator over every registered entry, in key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeEntry> {
        self.entries.iter()
    }
}

// Cuts `path` at its first comma outside of generic brackets.
fn strip_qualification(path: &str) -> &str {
    let mut depth = 0_usize;
    for (i, c) in path.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return path[..i].trim(),
            _ => {}
        }
    }
    path.trim()
}

#[cfg(test)]
mod tests {
    use super::{TypeRegistry, strip_qualification};
    use crate::info::{MemberInfo, ObjectInfo, PrimitiveKind, TypeInfo};
    use crate::registry::{RegistryError, TypeKey};
    use crate::value::Value;

    fn base_and_sub() -> (TypeRegistry, TypeKey, TypeKey) {
        let mut registry = TypeRegistry::new();
        let base = registry
            .register(TypeInfo::object(
                "app::Base",
                ObjectInfo::new().with_member(MemberInfo::field("id", "i32")),
            ))
            .unwrap();
        let sub = registry
            .register(TypeInfo::object(
                "app::Sub",
                ObjectInfo::new()
                    .with_base("app::Base")
                    .with_member(MemberInfo::field("extra", "string"))
                    .sealed(),
            ))
            .unwrap();
        (registry, base, sub)
    }

    #[test]
    fn builtin_keys() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.key_of("object"), Some(TypeKey::OBJECT));
        assert_eq!(registry.key_of("u8[]"), Some(TypeKey::BYTES));
        for kind in PrimitiveKind::ALL {
            assert_eq!(registry.key_of(kind.name()), Some(TypeKey::of_primitive(kind)));
        }
    }

    #[test]
    fn inheritance() {
        let (registry, base, sub) = base_and_sub();
        assert!(registry.is_assignable(sub, base));
        assert!(!registry.is_assignable(base, sub));
        assert!(registry.may_have_subtypes(base));
        assert!(!registry.may_have_subtypes(sub));
        assert!(!registry.may_have_subtypes(TypeKey::I32));

        let members = registry.get(sub).unwrap().members();
        let names: alloc::vec::Vec<_> = members.iter().map(MemberInfo::name).collect();
        assert_eq!(names, ["id", "extra"]);
        assert_eq!(registry.member_index(sub, "extra"), Some(1));
    }

    #[test]
    fn registration_errors() {
        let (mut registry, ..) = base_and_sub();
        assert_eq!(
            registry.register(TypeInfo::object("app::Base", ObjectInfo::new())),
            Err(RegistryError::DuplicatePath("app::Base".into()))
        );
        assert!(matches!(
            registry.register(TypeInfo::object(
                "app::Orphan",
                ObjectInfo::new().with_base("app::Missing")
            )),
            Err(RegistryError::UnknownBase { .. })
        ));
        assert!(matches!(
            registry.register(TypeInfo::object(
                "app::Odd",
                ObjectInfo::new().with_base("i32")
            )),
            Err(RegistryError::BaseNotObject { .. })
        ));
    }

    #[test]
    fn generic_instances_are_shared() {
        let mut registry = TypeRegistry::new();
        let a = registry.list_of("i32").unwrap();
        let b = registry.list_of("i32").unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.array_of("u8").unwrap(), TypeKey::BYTES);
        let map = registry.map_of("string", "object").unwrap();
        assert_eq!(registry.get(map).unwrap().path(), "Dictionary<string, object>");
    }

    #[test]
    fn lenient_resolution() {
        let (mut registry, base, _) = base_and_sub();
        assert_eq!(registry.resolve_lenient("app::Base, App, Version=1.0.0.0"), Some(base));
        assert_eq!(registry.resolve_lenient("moved::Base"), Some(base));

        registry
            .register(TypeInfo::object("other::Base", ObjectInfo::new()))
            .unwrap();
        assert!(registry.is_ambiguous("Base"));
        assert_eq!(registry.resolve_lenient("moved::Base"), None);
        assert_eq!(
            strip_qualification("Dictionary<a, b>, Asm, Version=1"),
            "Dictionary<a, b>"
        );
    }

    #[test]
    fn member_defaults() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.member_default(&MemberInfo::field("n", "i32")),
            Value::I32(0)
        );
        assert_eq!(
            registry.member_default(&MemberInfo::field("n", "i32").nullable()),
            Value::Null
        );
        assert_eq!(
            registry.member_default(&MemberInfo::field("n", "i32").with_default(5)),
            Value::I32(5)
        );
        assert_eq!(
            registry.member_default(&MemberInfo::field("s", "string")),
            Value::Null
        );
    }
}
