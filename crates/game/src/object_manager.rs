//! Streaming object store.
//!
//! Objects near the camera live in the near map with physics bodies; everything else
//! sits in the far map as plain data. Membership only changes at tick boundaries, so
//! updates never see an object in both maps or in neither.

use crate::drawables::SpriteInstance;
use crate::objects::{to_far, to_near, FarObject, NearObject, ObjectId, UpdateContext};
use physics::{PhysicsWorld, RigidBodyHandle};
use std::collections::{BTreeMap, BTreeSet};

/// Distances controlling promotion and demotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamingConfig {
    pub view_distance: f32,
    /// Extra fraction of the activation distance before demotion.
    pub margin: f32,
}

impl StreamingConfig {
    pub fn new(view_distance: f32, margin: f32) -> Self {
        Self {
            view_distance,
            margin,
        }
    }

    pub fn activation_distance(&self) -> f32 {
        1.5 * self.view_distance
    }

    pub fn deactivation_distance(&self) -> f32 {
        self.activation_distance() * (1.0 + self.margin)
    }
}

/// What changed during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub promoted: Vec<ObjectId>,
    pub demoted: Vec<ObjectId>,
    pub removed: Vec<ObjectId>,
}

pub struct ObjectManager {
    near: BTreeMap<ObjectId, NearObject>,
    far: BTreeMap<ObjectId, FarObject>,
    pending_near: Vec<(ObjectId, FarObject)>,
    pending_far: Vec<(ObjectId, FarObject)>,
    pending_remove: Vec<ObjectId>,
    pinned: BTreeSet<ObjectId>,
    next_id: u64,
    config: StreamingConfig,
}

impl ObjectManager {
    pub fn new(config: StreamingConfig) -> Self {
        Self {
            near: BTreeMap::new(),
            far: BTreeMap::new(),
            pending_near: Vec::new(),
            pending_far: Vec::new(),
            pending_remove: Vec::new(),
            pinned: BTreeSet::new(),
            next_id: 1,
            config,
        }
    }

    pub fn config(&self) -> StreamingConfig {
        self.config
    }

    fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue a far object; it joins the far map at the next tick boundary.
    pub fn add_far(&mut self, far: FarObject) -> ObjectId {
        let id = self.allocate();
        self.pending_far.push((id, far));
        id
    }

    /// Queue an object that starts near. Its bodies are built at the next boundary.
    pub fn add_near(&mut self, far: FarObject) -> ObjectId {
        let id = self.allocate();
        self.pending_near.push((id, far));
        id
    }

    /// Insert a far object immediately. Only valid outside [`ObjectManager::tick`].
    pub fn add_far_now(&mut self, far: FarObject) -> ObjectId {
        let id = self.allocate();
        self.far.insert(id, far);
        id
    }

    /// Build an object's bodies and insert it near immediately.
    pub fn add_near_now(&mut self, far: FarObject, physics: &mut PhysicsWorld) -> ObjectId {
        let id = self.allocate();
        self.near.insert(id, to_near(id, far, physics));
        id
    }

    /// Re-insert a far object under a known id. Ids that are live or still waiting for
    /// the next boundary are ignored.
    pub fn restore_far(&mut self, id: ObjectId, far: FarObject) -> bool {
        if self.contains(id) || self.is_pending(id) {
            log::warn!("Object {} already exists, ignoring restore", id);
            return false;
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.far.insert(id, far);
        true
    }

    /// Request removal at the next boundary. Unknown or already removed ids are ignored.
    pub fn remove(&mut self, id: ObjectId) {
        if !self.pending_remove.contains(&id) {
            self.pending_remove.push(id);
        }
    }

    /// Keep an object near regardless of distance.
    pub fn pin(&mut self, id: ObjectId) {
        self.pinned.insert(id);
    }

    pub fn unpin(&mut self, id: ObjectId) {
        self.pinned.remove(&id);
    }

    pub fn is_pinned(&self, id: ObjectId) -> bool {
        self.pinned.contains(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.near.contains_key(&id) || self.far.contains_key(&id)
    }

    /// Whether an add for `id` is queued for the next boundary.
    pub fn is_pending(&self, id: ObjectId) -> bool {
        self.pending_near
            .iter()
            .chain(self.pending_far.iter())
            .any(|(pending, _)| *pending == id)
    }

    pub fn contains_near(&self, id: ObjectId) -> bool {
        self.near.contains_key(&id)
    }

    pub fn contains_far(&self, id: ObjectId) -> bool {
        self.far.contains_key(&id)
    }

    pub fn near(&self, id: ObjectId) -> Option<&NearObject> {
        self.near.get(&id)
    }

    pub fn near_mut(&mut self, id: ObjectId) -> Option<&mut NearObject> {
        self.near.get_mut(&id)
    }

    pub fn far(&self, id: ObjectId) -> Option<&FarObject> {
        self.far.get(&id)
    }

    pub fn far_mut(&mut self, id: ObjectId) -> Option<&mut FarObject> {
        self.far.get_mut(&id)
    }

    pub fn near_objects(&self) -> impl Iterator<Item = (ObjectId, &NearObject)> {
        self.near.iter().map(|(id, o)| (*id, o))
    }

    pub fn near_objects_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut NearObject)> {
        self.near.iter_mut().map(|(id, o)| (*id, o))
    }

    pub fn far_objects(&self) -> impl Iterator<Item = (ObjectId, &FarObject)> {
        self.far.iter().map(|(id, o)| (*id, o))
    }

    pub fn near_count(&self) -> usize {
        self.near.len()
    }

    pub fn far_count(&self) -> usize {
        self.far.len()
    }

    /// Objects waiting for the next tick boundary.
    pub fn pending_count(&self) -> usize {
        self.pending_near.len() + self.pending_far.len()
    }

    /// Object owning a physics body.
    pub fn object_for_body(&self, physics: &PhysicsWorld, body: RigidBodyHandle) -> Option<ObjectId> {
        physics
            .body_user_data(body)
            .map(ObjectId::from_user_data)
            .filter(|id| self.near.contains_key(id))
    }

    pub fn collect_sprites(&self, out: &mut Vec<SpriteInstance>) {
        for object in self.near.values() {
            object.collect_sprites(out);
        }
    }

    /// One simulation step: boundary, physics, updates, streaming decisions, boundary.
    pub fn tick(&mut self, physics: &mut PhysicsWorld, ctx: &UpdateContext<'_>) -> TickReport {
        let mut report = TickReport::default();
        self.apply_pending(physics, &mut report);

        physics.step(ctx.dt);
        for object in self.near.values_mut() {
            object.update(physics, ctx);
        }
        for object in self.far.values_mut() {
            object.update(ctx);
        }

        let activation = self.config.activation_distance();
        let deactivation = self.config.deactivation_distance();
        let mut removals = Vec::new();
        let mut demotions = Vec::new();
        for (id, object) in &self.near {
            if object.should_be_removed() {
                removals.push(*id);
            } else if !self.pinned.contains(id)
                && ctx.camera.distance(object.position()) - object.radius() > deactivation
            {
                demotions.push(*id);
            }
        }
        let mut promotions = Vec::new();
        for (id, object) in &self.far {
            if object.should_be_removed() {
                removals.push(*id);
            } else if self.pinned.contains(id)
                || ctx.camera.distance(object.position()) - object.radius() < activation
            {
                promotions.push(*id);
            }
        }

        for id in removals {
            self.remove(id);
        }
        for id in demotions {
            if let Some(near) = self.near.remove(&id) {
                self.far.insert(id, to_far(near, physics));
                report.demoted.push(id);
            }
        }
        for id in promotions {
            if let Some(far) = self.far.remove(&id) {
                self.near.insert(id, to_near(id, far, physics));
                report.promoted.push(id);
            }
        }

        self.apply_pending(physics, &mut report);
        if !report.promoted.is_empty() || !report.demoted.is_empty() {
            log::debug!(
                "Streaming: {} promoted, {} demoted, {} near, {} far",
                report.promoted.len(),
                report.demoted.len(),
                self.near.len(),
                self.far.len()
            );
        }
        report
    }

    fn apply_pending(&mut self, physics: &mut PhysicsWorld, report: &mut TickReport) {
        for (id, far) in std::mem::take(&mut self.pending_far) {
            self.far.insert(id, far);
        }
        for (id, far) in std::mem::take(&mut self.pending_near) {
            self.near.insert(id, to_near(id, far, physics));
        }
        for id in std::mem::take(&mut self.pending_remove) {
            let removed = if let Some(near) = self.near.remove(&id) {
                near.release(physics);
                true
            } else {
                self.far.remove(&id).is_some()
            };
            self.pinned.remove(&id);
            if removed {
                report.removed.push(id);
            }
        }
    }
}
