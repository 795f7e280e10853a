//! Core types used throughout Skirmish

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a combat participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub Uuid);

impl CombatantId {
    /// Create a new random combatant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a combatant ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First block of the UUID is enough to tell combatants apart in logs
        let simple = self.0.simple().to_string();
        write!(f, "{}", &simple[..8])
    }
}

/// Position and orientation of a combatant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a transform at `position` facing `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut transform = Self::from_position(position);
        transform.face_toward(target);
        transform
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Translate by the given offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate by the given quaternion
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = rotation * self.rotation;
    }

    /// Turn so that `forward()` points at the target. No-op if the target is
    /// at the current position.
    pub fn face_toward(&mut self, target: Vec3) {
        let Some(direction) = (target - self.position).try_normalize() else {
            return;
        };
        self.rotation = Quat::from_rotation_arc(-Vec3::Z, direction);
    }

    /// Unit direction from this transform's position to `target`
    pub fn direction_to(&self, target: Vec3) -> Option<Vec3> {
        (target - self.position).try_normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_forward_is_negative_z() {
        let transform = Transform::default();
        assert!((transform.forward() - -Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_looking_at_target() {
        let transform = Transform::looking_at(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!((transform.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_face_toward_same_position_keeps_rotation() {
        let mut transform = Transform::from_position(Vec3::ONE);
        transform.face_toward(Vec3::ONE);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_direction_to() {
        let transform = Transform::from_position(Vec3::ZERO);
        let dir = transform.direction_to(Vec3::new(0.0, 0.0, 5.0)).unwrap();
        assert!((dir - Vec3::Z).length() < 1e-6);
        assert!(transform.direction_to(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_combatant_ids_unique() {
        let a = CombatantId::new();
        let b = CombatantId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 8);
    }
}
