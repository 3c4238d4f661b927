use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const DEFAULT_COLORS: &[&str] = &[
    "#26ccff", "#a25afd", "#ff5e7e", "#88ff5a", "#fcff42", "#ffa62d", "#ff36ff",
];

/// Shape of the celebratory burst shown after a confirmed write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfettiConfig {
    pub particle_count: u32,
    /// Cone width, centred on straight up.
    pub spread_degrees: f32,
    /// Launch point as a fraction of page height from the top.
    pub origin_y: f32,
    pub start_velocity: f32,
    /// Downward drift added over the animation, in px.
    pub gravity_px: f32,
    pub duration_millis: u32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            spread_degrees: 70.0,
            origin_y: 0.6,
            start_velocity: 45.0,
            gravity_px: 220.0,
            duration_millis: 2_500,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Launch direction; -90 is straight up.
    pub angle_degrees: f32,
    pub velocity: f32,
    pub color: &'static str,
    pub size_px: f32,
    pub delay_millis: u32,
}

impl Particle {
    /// Final offset from the origin in px (x right, y down).
    pub fn displacement(&self, gravity_px: f32) -> (f32, f32) {
        let radians = self.angle_degrees.to_radians();
        let reach = self.velocity * 8.0;
        (reach * radians.cos(), reach * radians.sin() + gravity_px)
    }
}

/// Lay out one burst. The same seed always yields the same particles.
pub fn burst(seed: u64, config: &ConfettiConfig) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = config.spread_degrees / 2.0;
    (0..config.particle_count)
        .map(|_| {
            let offset = if half > 0.0 {
                rng.gen_range(-half..=half)
            } else {
                0.0
            };
            Particle {
                angle_degrees: -90.0 + offset,
                velocity: config.start_velocity * rng.gen_range(0.5..=1.0),
                color: DEFAULT_COLORS[rng.gen_range(0..DEFAULT_COLORS.len())],
                size_px: rng.gen_range(6.0..=10.0),
                delay_millis: rng.gen_range(0..150),
            }
        })
        .collect()
}
