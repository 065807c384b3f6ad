use bevy_ecs::prelude::Component;

/// Free-form classification label of an entity (e.g. `"Player"`).
///
/// Tag-mode sensors and line-of-sight checks compare against it by exact,
/// case-sensitive equality.
#[derive(Component, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is(&self, other: &str) -> bool {
        self.0 == other
    }
}
