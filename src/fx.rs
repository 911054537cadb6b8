// Sparkles: small pastel glows that burst out when a photo is taken or a
// strip is saved, drift for a moment and fade. Software-drawn, additive.

use crate::types::FrameBuffer;

/// Deterministic xorshift32 RNG; controls burst spread, drift and lifetimes.
#[derive(Clone)]
struct Rng32 {
    state: u32,
}

impl Rng32 {
    fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform [0,1)
    #[inline]
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / ((1u32 << 24) as f32)
    }

    #[inline]
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

/// Additive blend one RGB triplet at (x,y), saturating at 255.
#[inline]
fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, rgb: [u8; 3]) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let i = (y * fb.width + x) * 4;
    for c in 0..3 {
        fb.pixels[i + c] = fb.pixels[i + c].saturating_add(rgb[c]);
    }
}

/// Soft round glow with Gaussian falloff, 1.0 at the center.
fn draw_additive_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, base: [u8; 3], strength: f32) {
    if radius <= 0 {
        return;
    }
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;

    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            let w = (-d2 / denom).exp() * strength;
            let rgb = base.map(|c| (c as f32 * w).round().clamp(0.0, 255.0) as u8);
            add_rgb_saturating(fb, x, y, rgb);
        }
    }
}

const PALETTE: [[u8; 3]; 3] = [[255, 182, 213], [255, 215, 120], [210, 190, 255]];

/// One sparkle: drifts a little and fades out.
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,     // remaining seconds
    pub max_life: f32, // initial lifetime, for the fade
    pub color: [u8; 3],
}

impl Particle {
    #[inline]
    fn alive(&self) -> bool {
        self.life > 0.0
    }
}

pub struct Sparkles {
    rng: Rng32,
    particles: Vec<Particle>,
    max_particles: usize,
}

impl Sparkles {
    pub fn new(max_particles: usize) -> Self {
        Self {
            rng: Rng32::from_seed(0xC0FFEE),
            particles: Vec::with_capacity(max_particles),
            max_particles,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Scatter `count` sparkles within ±50 px of (x,y).
    pub fn burst(&mut self, x: f32, y: f32, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let px = x + self.rng.range(-50.0, 50.0);
            let py = y + self.rng.range(-50.0, 50.0);
            let speed = self.rng.range(20.0, 60.0);
            let angle = self.rng.range(0.0, std::f32::consts::TAU);
            let max_life = self.rng.range(0.6, 1.0);
            let color = PALETTE[(self.rng.next_u32() % PALETTE.len() as u32) as usize];
            self.particles.push(Particle {
                x: px,
                y: py,
                vx: speed * angle.cos(),
                vy: speed * angle.sin() - 15.0,
                life: max_life,
                max_life,
                color,
            });
        }
    }

    /// Step the simulation by `dt` seconds and draw what is still alive.
    pub fn update_and_render(&mut self, fb: &mut FrameBuffer, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vx *= 0.98;
            p.vy = p.vy * 0.98 + 10.0 * dt;
            p.life -= dt;

            if p.alive() {
                let life01 = (p.life / p.max_life).clamp(0.0, 1.0);
                let radius = (6.0 * life01 + 2.0) as i32;
                draw_additive_disc(fb, p.x as i32, p.y as i32, radius, p.color, 0.9 * life01);
                i += 1;
            } else {
                self.particles.swap_remove(i);
            }
        }
    }
}
