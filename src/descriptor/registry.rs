use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use crate::{DescriptorError, DescriptorPool, FieldDescriptor, MessageDescriptor};

/// A lookup table of extension fields, keyed by extended message and field number.
///
/// A registry is bound to each [`DynamicMessage`](crate::DynamicMessage) and consulted when a
/// field number or `[name]` JSON key is not a regular field of the message. It uses reference
/// counting internally, so it is cheap to clone and share between messages; additions made after
/// cloning do not affect earlier clones.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    inner: Arc<ExtensionRegistryInner>,
}

#[derive(Clone, Default)]
struct ExtensionRegistryInner {
    by_number: HashMap<String, BTreeMap<u32, FieldDescriptor>>,
    by_name: HashMap<String, HashMap<String, FieldDescriptor>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ExtensionRegistry::default()
    }

    /// Creates a registry holding every extension declared in `pool`.
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        let mut registry = ExtensionRegistry::new();
        for extension in pool.all_extensions() {
            registry.insert(extension);
        }
        registry
    }

    /// Adds an extension field to this registry, replacing any extension previously registered
    /// for the same message and number.
    pub fn add_extension(&mut self, extension: FieldDescriptor) -> Result<(), DescriptorError> {
        if !extension.is_extension() {
            return Err(DescriptorError::not_an_extension(extension.full_name()));
        }
        self.insert(extension);
        Ok(())
    }

    fn insert(&mut self, extension: FieldDescriptor) {
        let extendee = extension.containing_message().full_name().to_owned();
        let inner = Arc::make_mut(&mut self.inner);
        inner
            .by_name
            .entry(extendee.clone())
            .or_default()
            .insert(extension.full_name().to_owned(), extension.clone());
        inner
            .by_number
            .entry(extendee)
            .or_default()
            .insert(extension.number(), extension);
    }

    /// Finds the extension of `message` with the given field number.
    pub fn find_extension(
        &self,
        message: &MessageDescriptor,
        number: u32,
    ) -> Option<FieldDescriptor> {
        self.inner
            .by_number
            .get(message.full_name())?
            .get(&number)
            .cloned()
    }

    /// Finds the extension of `message` with the given fully qualified name.
    pub fn find_extension_by_name(
        &self,
        message: &MessageDescriptor,
        name: &str,
    ) -> Option<FieldDescriptor> {
        self.inner
            .by_name
            .get(message.full_name())?
            .get(name.trim_start_matches('.'))
            .cloned()
    }

    /// Gets an iterator over the extensions registered for `message`, in field number order.
    pub fn extensions<'a>(
        &'a self,
        message: &MessageDescriptor,
    ) -> impl Iterator<Item = FieldDescriptor> + 'a {
        self.inner
            .by_number
            .get(message.full_name())
            .into_iter()
            .flat_map(|extensions| extensions.values().cloned())
    }

    /// Returns `true` if no extensions are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.by_number.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.by_number.iter().map(|(message, extensions)| {
                (message, extensions.values().map(|e| e.full_name()).collect::<Vec<_>>())
            }))
            .finish()
    }
}
