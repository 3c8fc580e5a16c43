//! Collision groups and filtering.

use rapier2d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Planet ground tiles
    Ground = 1 << 0,
    /// Ordinary ships
    Ship = 1 << 1,
    /// Stations sitting on planet surfaces
    Station = 1 << 2,
    /// Maze walls
    Structure = 1 << 3,
}

impl CollisionGroup {
    /// Create a collision group that collides with everything.
    pub fn all() -> Group {
        Group::ALL
    }

    fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Ground collides with everything that moves.
    pub fn ground() -> InteractionGroups {
        InteractionGroups::new(Self::Ground.bits(), Group::ALL)
    }

    /// Ships collide with everything.
    pub fn ship() -> InteractionGroups {
        InteractionGroups::new(Self::Ship.bits(), Group::ALL)
    }

    /// Stations collide with ships but not with the ground they are built on.
    pub fn station() -> InteractionGroups {
        InteractionGroups::new(
            Self::Station.bits(),
            Group::from_bits_retain(Self::Ship as u32 | Self::Structure as u32),
        )
    }

    /// Maze walls collide with ships and stations.
    pub fn structure() -> InteractionGroups {
        InteractionGroups::new(
            Self::Structure.bits(),
            Group::from_bits_retain(Self::Ship as u32 | Self::Station as u32),
        )
    }

    /// Query groups that only see planet ground.
    pub fn ground_query() -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Self::Ground.bits())
    }
}

/// Handles linking a world object to its physics representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: Option<ColliderHandle>,
}

impl PhysicsBody {
    pub fn new(rigid_body: RigidBodyHandle) -> Self {
        Self {
            rigid_body,
            collider: None,
        }
    }

    pub fn with_collider(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider: Some(collider),
        }
    }
}
