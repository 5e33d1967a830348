//! Positioned, sized objects placed inside a phase.

use phasewalk_core::{EntityId, EntityKind, Point, Rect, Size};

/// Collidable object with an authoritative world position.
///
/// The world box is always derived from the position and the immutable
/// size. The screen box is recomputed from the camera origin every tick and
/// never feeds back into the world position.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialEntity {
    id: EntityId,
    kind: EntityKind,
    position: Point,
    size: Size,
    screen: Rect,
    life: f32,
}

impl SpatialEntity {
    /// Creates an entity at `position`. The screen box starts aligned with
    /// the world box, as if the camera sat at the world origin.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, position: Point, size: Size, life: f32) -> Self {
        Self {
            id,
            kind,
            position,
            size,
            screen: Rect::from_origin_and_size(position, size),
            life,
        }
    }

    /// Identifier assigned by the owning phase.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Role the entity plays in the phase.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Authoritative world position of the upper-left corner.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Immutable size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Bounding box in world coordinates.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::from_origin_and_size(self.position, self.size)
    }

    /// Bounding box in camera-relative coordinates as of the last translation.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }

    /// Remaining depletable resource.
    #[must_use]
    pub const fn life(&self) -> f32 {
        self.life
    }

    /// Reports whether the depletable resource is exhausted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.life <= 0.0
    }

    /// Translates the world position by `delta`, clamped into `[min, max]`.
    pub fn apply_movement(&mut self, delta: Point, min: Point, max: Point) {
        self.position = self.position.offset(delta.x, delta.y).clamp(min, max);
    }

    /// Re-expresses the world box relative to `origin`.
    pub fn apply_translation(&mut self, origin: Point) {
        self.screen = self.bounds().relative_to(origin);
    }

    /// Reduces the depletable resource by `amount`.
    pub fn drain_life(&mut self, amount: f32) {
        self.life -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_at(x: f32, y: f32) -> SpatialEntity {
        SpatialEntity::new(
            EntityId::new(1),
            EntityKind::Npc,
            Point::new(x, y),
            Size::new(20.0, 30.0).expect("valid size"),
            1.0,
        )
    }

    #[test]
    fn translation_is_a_pure_function_of_position_and_origin() {
        let mut entity = entity_at(300.0, 200.0);
        let origin = Point::new(120.0, 45.0);

        entity.apply_translation(origin);
        let first = entity.screen();
        entity.apply_translation(origin);

        assert_eq!(first, Rect::new(180.0, 155.0, 20.0, 30.0));
        assert_eq!(entity.screen(), first);
        assert_eq!(entity.position(), Point::new(300.0, 200.0));
    }

    #[test]
    fn movement_is_clamped_to_bounds() {
        let mut entity = entity_at(5.0, 95.0);
        entity.apply_movement(
            Point::new(-20.0, 20.0),
            Point::ZERO,
            Point::new(100.0, 100.0),
        );
        assert_eq!(entity.position(), Point::new(0.0, 100.0));
        assert_eq!(entity.bounds(), Rect::new(0.0, 100.0, 20.0, 30.0));
    }

    #[test]
    fn draining_life_reaches_depletion() {
        let mut entity = entity_at(0.0, 0.0);
        entity.drain_life(0.4);
        assert!(!entity.is_depleted());
        entity.drain_life(0.6);
        assert!(entity.is_depleted());
    }
}
