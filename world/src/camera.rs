//! Camera that follows the player and culls what presentation receives.

use phasewalk_core::{Drawable, Point, Rect, Size};

/// Viewport sliding over a bounded world.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    viewport: Size,
    world: Size,
    origin: Point,
}

impl Camera {
    /// Creates a camera anchored at the world origin.
    #[must_use]
    pub const fn new(viewport: Size, world: Size) -> Self {
        Self {
            viewport,
            world,
            origin: Point::ZERO,
        }
    }

    /// World-space position of the viewport's upper-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Size of the viewport.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Centres the viewport on `focus`, keeping it inside the world.
    pub fn follow(&mut self, focus: Point) {
        let half = self.viewport.half();
        let max = Point::new(
            (self.world.width() - self.viewport.width()).max(0.0),
            (self.world.height() - self.viewport.height()).max(0.0),
        );
        self.origin = focus.offset(-half.x, -half.y).clamp(Point::ZERO, max);
    }

    /// Reports whether a camera-relative box overlaps the viewport.
    #[must_use]
    pub fn is_visible(&self, screen: &Rect) -> bool {
        Rect::from_origin_and_size(Point::ZERO, self.viewport).intersects(screen)
    }

    /// Keeps the reachable drawables that are on screen and appends the player.
    ///
    /// The player is always included, whether or not it overlaps the viewport.
    #[must_use]
    pub fn cull<I>(&self, player: Drawable, reachable: I) -> Vec<Drawable>
    where
        I: IntoIterator<Item = Drawable>,
    {
        let mut drawables: Vec<Drawable> = reachable
            .into_iter()
            .filter(|drawable| self.is_visible(&drawable.screen))
            .collect();
        drawables.push(player);
        drawables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasewalk_core::{EntityId, EntityKind, Tag};

    fn camera() -> Camera {
        Camera::new(
            Size::new(800.0, 600.0).expect("viewport"),
            Size::new(4000.0, 2000.0).expect("world"),
        )
    }

    fn drawable(id: u32, kind: EntityKind, screen: Rect) -> Drawable {
        Drawable {
            tag: Tag::Entity(EntityId::new(id)),
            kind,
            screen,
        }
    }

    #[test]
    fn follow_centres_on_focus() {
        let mut camera = camera();
        camera.follow(Point::new(1000.0, 700.0));
        assert_eq!(camera.origin(), Point::new(600.0, 400.0));
    }

    #[test]
    fn follow_clamps_to_world_edges() {
        let mut camera = camera();
        camera.follow(Point::new(10.0, 10.0));
        assert_eq!(camera.origin(), Point::ZERO);

        camera.follow(Point::new(3990.0, 1990.0));
        assert_eq!(camera.origin(), Point::new(3200.0, 1400.0));
    }

    #[test]
    fn follow_pins_origin_when_world_is_smaller_than_viewport() {
        let mut camera = Camera::new(
            Size::new(800.0, 600.0).expect("viewport"),
            Size::new(400.0, 300.0).expect("world"),
        );
        camera.follow(Point::new(200.0, 150.0));
        assert_eq!(camera.origin(), Point::ZERO);
    }

    #[test]
    fn cull_drops_off_screen_items_but_keeps_player() {
        let camera = camera();
        let player = drawable(0, EntityKind::Player, Rect::new(-500.0, -500.0, 10.0, 10.0));
        let on_screen = drawable(1, EntityKind::Npc, Rect::new(100.0, 100.0, 10.0, 10.0));
        let off_screen = drawable(2, EntityKind::Obstacle, Rect::new(900.0, 100.0, 10.0, 10.0));

        let culled = camera.cull(player, [on_screen, off_screen]);

        assert_eq!(culled, vec![on_screen, player]);
    }
}
