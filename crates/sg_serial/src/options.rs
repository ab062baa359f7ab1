use alloc::string::String;

/// Runtime configuration of a [`Serializer`](crate::Serializer).
///
/// # Examples
///
/// ```
/// use sg_serial::SerializerOptions;
///
/// let options = SerializerOptions::default()
///     .public_only(true)
///     .name("ui snapshot");
///
/// assert!(options.is_public_only());
/// assert!(!options.is_lazy());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerializerOptions {
    /// Only save and load data marked public (or protected inside public types).
    pub public_only: bool,
    /// Defer virtual properties until [`Serializer::resolve_member`].
    ///
    /// [`Serializer::resolve_member`]: crate::Serializer::resolve_member
    pub lazy: bool,
    /// Label written into the stream header.
    pub name: String,
}

impl SerializerOptions {
    #[inline]
    pub fn public_only(mut self, public_only: bool) -> Self {
        self.public_only = public_only;
        self
    }

    #[inline]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn is_public_only(&self) -> bool {
        self.public_only
    }

    #[inline]
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }
}
