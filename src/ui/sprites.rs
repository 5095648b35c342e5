/// Sprite factory: procedurally rasterizes every visual kind into a
/// reusable pixel image, once, before play begins.
///
/// Each sprite is composed from axis-aligned filled rectangles,
/// circles and ellipses of solid colors at hard-coded offsets — no
/// image assets. Transparent texels are `None`. The renderer samples
/// these rasters through the camera; every instance of a kind shares
/// the one raster built here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

// Palette
const RED: Rgb = Rgb(0xff, 0x00, 0x00);
const ORANGE: Rgb = Rgb(0xff, 0xa5, 0x00);
const BLUE: Rgb = Rgb(0x00, 0x00, 0xff);
const BROWN: Rgb = Rgb(0x8b, 0x45, 0x13);
const CHOCOLATE: Rgb = Rgb(0xd2, 0x69, 0x1e);
const SIENNA: Rgb = Rgb(0xa0, 0x52, 0x2d);
const YELLOW: Rgb = Rgb(0xff, 0xff, 0x00);
const GREEN: Rgb = Rgb(0x00, 0xff, 0x00);
const DARK_GREEN: Rgb = Rgb(0x00, 0x80, 0x00);
const GOLD: Rgb = Rgb(0xff, 0xd7, 0x00);
const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

/// Sky backdrop behind everything.
pub const SKY: Rgb = Rgb(0x5c, 0x94, 0xfc);

/// A fixed-size pixel image with transparency.
#[derive(Clone, Debug)]
pub struct Raster {
    pub w: usize,
    pub h: usize,
    px: Vec<Option<Rgb>>,
}

impl Raster {
    fn new(w: usize, h: usize) -> Self {
        Raster { w, h, px: vec![None; w * h] }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.w && y < self.h {
            self.px[y * self.w + x]
        } else {
            None
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        for py in y..(y + h).min(self.h) {
            for px in x..(x + w).min(self.w) {
                self.px[py * self.w + px] = Some(color);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb) {
        self.fill_ellipse_axes(cx, cy, r, r, color);
    }

    fn fill_ellipse(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: Rgb) {
        self.fill_ellipse_axes(cx, cy, w / 2.0, h / 2.0, color);
    }

    fn fill_ellipse_axes(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgb) {
        for py in 0..self.h {
            for px in 0..self.w {
                let dx = (px as f32 + 0.5 - cx) / rx;
                let dy = (py as f32 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.px[py * self.w + px] = Some(color);
                }
            }
        }
    }
}

/// The eight visual kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpriteKind {
    Player,
    Brick,
    Question,
    Ground,
    Pipe,
    Enemy,
    Coin,
    Mushroom,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 8] = [
        SpriteKind::Player,
        SpriteKind::Brick,
        SpriteKind::Question,
        SpriteKind::Ground,
        SpriteKind::Pipe,
        SpriteKind::Enemy,
        SpriteKind::Coin,
        SpriteKind::Mushroom,
    ];
}

/// One raster per kind, built once at startup.
pub struct SpriteBank {
    player: Raster,
    brick: Raster,
    question: Raster,
    ground: Raster,
    pipe: Raster,
    enemy: Raster,
    coin: Raster,
    mushroom: Raster,
}

impl SpriteBank {
    pub fn new() -> Self {
        SpriteBank {
            player: build_player(),
            brick: build_brick(),
            question: build_question(),
            ground: build_ground(),
            pipe: build_pipe(),
            enemy: build_enemy(),
            coin: build_coin(),
            mushroom: build_mushroom(),
        }
    }

    pub fn raster(&self, kind: SpriteKind) -> &Raster {
        match kind {
            SpriteKind::Player => &self.player,
            SpriteKind::Brick => &self.brick,
            SpriteKind::Question => &self.question,
            SpriteKind::Ground => &self.ground,
            SpriteKind::Pipe => &self.pipe,
            SpriteKind::Enemy => &self.enemy,
            SpriteKind::Coin => &self.coin,
            SpriteKind::Mushroom => &self.mushroom,
        }
    }
}

// ── Builders, one per kind ──

/// 16x28: cap, face, torso, overall legs, boots.
fn build_player() -> Raster {
    let mut r = Raster::new(16, 28);
    r.fill_rect(2, 0, 12, 4, RED);
    r.fill_rect(0, 4, 16, 4, RED);
    r.fill_rect(2, 8, 12, 4, ORANGE);
    r.fill_rect(0, 12, 6, 4, BLUE);
    r.fill_rect(10, 12, 6, 4, BLUE);
    r.fill_rect(2, 16, 4, 8, ORANGE);
    r.fill_rect(10, 16, 4, 8, ORANGE);
    r.fill_rect(0, 24, 6, 4, BROWN);
    r.fill_rect(10, 24, 6, 4, BROWN);
    r
}

/// 32x32: base with darker top/left edges and four inset studs.
fn build_brick() -> Raster {
    let mut r = Raster::new(32, 32);
    r.fill_rect(0, 0, 32, 32, CHOCOLATE);
    r.fill_rect(0, 0, 32, 2, BROWN);
    r.fill_rect(0, 0, 2, 32, BROWN);
    r.fill_rect(8, 8, 6, 6, SIENNA);
    r.fill_rect(18, 8, 6, 6, SIENNA);
    r.fill_rect(8, 18, 6, 6, SIENNA);
    r.fill_rect(18, 18, 6, 6, SIENNA);
    r
}

/// 32x32: orange block with a yellow "?" cross.
fn build_question() -> Raster {
    let mut r = Raster::new(32, 32);
    r.fill_rect(0, 0, 32, 32, ORANGE);
    r.fill_rect(12, 8, 8, 16, YELLOW);
    r.fill_rect(8, 12, 16, 8, YELLOW);
    r
}

/// 32x32: dirt with a lighter top lip.
fn build_ground() -> Raster {
    let mut r = Raster::new(32, 32);
    r.fill_rect(0, 0, 32, 32, BROWN);
    r.fill_rect(0, 0, 32, 4, SIENNA);
    r
}

/// 64x96: green body, dark rim and inset column.
fn build_pipe() -> Raster {
    let mut r = Raster::new(64, 96);
    r.fill_rect(0, 0, 64, 96, GREEN);
    r.fill_rect(0, 0, 64, 16, DARK_GREEN);
    r.fill_rect(8, 16, 48, 80, DARK_GREEN);
    r
}

/// 24x28: brown cap, orange body, eyes, feet.
fn build_enemy() -> Raster {
    let mut r = Raster::new(24, 28);
    r.fill_rect(4, 0, 16, 8, BROWN);
    r.fill_rect(0, 8, 24, 12, ORANGE);
    r.fill_rect(6, 10, 3, 3, BLACK);
    r.fill_rect(15, 10, 3, 3, BLACK);
    r.fill_rect(0, 20, 10, 8, BROWN);
    r.fill_rect(14, 20, 10, 8, BROWN);
    r
}

/// 24x24: gold disc with a brighter core.
fn build_coin() -> Raster {
    let mut r = Raster::new(24, 24);
    r.fill_circle(12.0, 12.0, 10.0, GOLD);
    r.fill_circle(12.0, 12.0, 6.0, YELLOW);
    r
}

/// 32x28: red cap with white spots on an orange stalk.
fn build_mushroom() -> Raster {
    let mut r = Raster::new(32, 28);
    r.fill_ellipse(16.0, 12.0, 28.0, 20.0, RED);
    r.fill_circle(10.0, 10.0, 4.0, WHITE);
    r.fill_circle(22.0, 10.0, 4.0, WHITE);
    r.fill_rect(10, 16, 12, 12, ORANGE);
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_covers_every_kind() {
        let bank = SpriteBank::new();
        for kind in SpriteKind::ALL {
            let r = bank.raster(kind);
            assert!(r.w > 0 && r.h > 0);
            // Every sprite has at least one opaque texel
            assert!((0..r.h).any(|y| (0..r.w).any(|x| r.get(x, y).is_some())));
        }
    }

    #[test]
    fn raster_dimensions() {
        let bank = SpriteBank::new();
        assert_eq!((bank.raster(SpriteKind::Player).w, bank.raster(SpriteKind::Player).h), (16, 28));
        assert_eq!((bank.raster(SpriteKind::Brick).w, bank.raster(SpriteKind::Brick).h), (32, 32));
        assert_eq!((bank.raster(SpriteKind::Pipe).w, bank.raster(SpriteKind::Pipe).h), (64, 96));
        assert_eq!((bank.raster(SpriteKind::Enemy).w, bank.raster(SpriteKind::Enemy).h), (24, 28));
        assert_eq!((bank.raster(SpriteKind::Coin).w, bank.raster(SpriteKind::Coin).h), (24, 24));
        assert_eq!((bank.raster(SpriteKind::Mushroom).w, bank.raster(SpriteKind::Mushroom).h), (32, 28));
    }

    #[test]
    fn player_wears_a_red_cap_and_brown_boots() {
        let r = build_player();
        assert_eq!(r.get(8, 1), Some(RED));
        assert_eq!(r.get(2, 26), Some(BROWN));
        // Gap between the legs is transparent
        assert_eq!(r.get(8, 26), None);
    }

    #[test]
    fn coin_is_round() {
        let r = build_coin();
        assert_eq!(r.get(12, 12), Some(YELLOW)); // bright core
        assert_eq!(r.get(12, 4), Some(GOLD));    // outer ring
        assert_eq!(r.get(0, 0), None);           // corners transparent
        assert_eq!(r.get(23, 23), None);
    }

    #[test]
    fn question_block_is_fully_opaque() {
        let r = build_question();
        assert!((0..r.h).all(|y| (0..r.w).all(|x| r.get(x, y).is_some())));
        assert_eq!(r.get(15, 15), Some(YELLOW));
        assert_eq!(r.get(1, 1), Some(ORANGE));
    }

    #[test]
    fn out_of_bounds_sampling_is_transparent() {
        let r = build_brick();
        assert_eq!(r.get(32, 0), None);
        assert_eq!(r.get(0, 32), None);
    }
}
