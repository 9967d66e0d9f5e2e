//! Entity snapshots, references and the keyed collections the host hands over.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Default name of the image registered before the core operation.
pub const PRE_IMAGE: &str = "PreImage";

/// Default name of the image registered after the core operation.
pub const POST_IMAGE: &str = "PostImage";

/// Input parameter holding the entity the message targets.
pub const TARGET: &str = "Target";

/// A lightweight pointer to a record: logical name plus id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    /// Logical name of the entity type.
    pub logical_name: String,
    /// Record id.
    pub id: Uuid,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    /// Creates a new reference.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.logical_name, self.id)
    }
}

/// A snapshot of a record's attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    /// Logical name of the entity type.
    pub logical_name: String,
    /// Record id. Nil for records not yet created.
    #[serde(default)]
    pub id: Uuid,
    /// Attribute values keyed by attribute logical name.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Entity {
    /// Creates an empty entity snapshot.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Gets an attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns a reference to this record.
    #[must_use]
    pub fn to_reference(&self) -> EntityReference {
        EntityReference::new(self.logical_name.clone(), self.id)
    }
}

/// Entity images keyed by their registered image name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityImageCollection {
    images: BTreeMap<String, Entity>,
}

impl EntityImageCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an image.
    #[must_use]
    pub fn with_image(mut self, name: impl Into<String>, image: Entity) -> Self {
        self.images.insert(name.into(), image);
        self
    }

    /// Gets an image by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.images.get(name)
    }

    /// Returns true if an image with the name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Returns the number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if there are no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Iterates images in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.images.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Named request parameters, stored as JSON values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterCollection {
    values: BTreeMap<String, serde_json::Value>,
}

impl ParameterCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Gets a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Gets a parameter and deserializes it into `T`.
    ///
    /// Returns `None` when the parameter is missing or has a different shape.
    #[must_use]
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.values
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Returns true if the parameter exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_reference_display() {
        let id = Uuid::new_v4();
        let reference = EntityReference::new("account", id);
        assert_eq!(reference.to_string(), format!("account({id})"));
    }

    #[test]
    fn test_entity_to_reference() {
        let id = Uuid::new_v4();
        let entity = Entity::new("contact", id).with_attribute("firstname", serde_json::json!("Ada"));
        assert_eq!(entity.to_reference(), EntityReference::new("contact", id));
        assert_eq!(entity.get("firstname"), Some(&serde_json::json!("Ada")));
    }

    #[test]
    fn test_image_collection_lookup() {
        let images = EntityImageCollection::new().with_image(PRE_IMAGE, Entity::new("account", Uuid::nil()));
        assert!(images.contains(PRE_IMAGE));
        assert!(images.get(POST_IMAGE).is_none());
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_parameter_get_as_entity() {
        let target = Entity::new("account", Uuid::new_v4()).with_attribute("name", serde_json::json!("Contoso"));
        let params = ParameterCollection::new().with(TARGET, serde_json::to_value(&target).unwrap());

        let read: Entity = params.get_as(TARGET).unwrap();
        assert_eq!(read, target);
        assert!(params.get_as::<Entity>("Missing").is_none());
    }

    #[test]
    fn test_parameter_get_as_wrong_shape() {
        let params = ParameterCollection::new().with(TARGET, serde_json::json!(42));
        assert!(params.get_as::<Entity>(TARGET).is_none());
    }
}
