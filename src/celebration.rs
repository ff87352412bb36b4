use crate::game::OutcomeListener;
use crate::session::SessionSummary;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::TAU;

const CONFETTI_SYMBOLS: [char; 6] = ['*', '+', '~', 'o', '•', '✦'];
const FIREWORK_SYMBOLS: [char; 3] = ['*', '·', '✺'];
const FIREWORK_BURSTS: usize = 5;
const SPARKS_PER_BURST: usize = 30;
const CONFETTI_PIECES: usize = 100;
const RAIN_DROPS: usize = 40;
/// fixed animation step per UI tick, seconds
const STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Confetti,
    Spark,
    Rain,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// seconds before the particle shows up
    pub delay: f64,
    pub kind: ParticleKind,
}

impl Particle {
    fn confetti<R: Rng>(rng: &mut R, width: f64) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            y: -1.0,
            vel_x: rng.gen_range(-1.5..1.5),
            vel_y: rng.gen_range(2.0..6.0),
            symbol: *CONFETTI_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..8),
            age: 0.0,
            max_age: 3.0,
            delay: rng.gen_range(0.0..1.5),
            kind: ParticleKind::Confetti,
        }
    }

    fn spark<R: Rng>(rng: &mut R, cx: f64, cy: f64, angle: f64, delay: f64, color: usize) -> Self {
        // terminal cells are about twice as tall as wide
        let speed = rng.gen_range(8.0..16.0);
        Self {
            x: cx,
            y: cy,
            vel_x: angle.cos() * speed,
            vel_y: angle.sin() * speed / 2.0,
            symbol: *FIREWORK_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: color,
            age: 0.0,
            max_age: 1.0,
            delay,
            kind: ParticleKind::Spark,
        }
    }

    fn rain<R: Rng>(rng: &mut R, width: f64) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            y: -1.0,
            vel_x: 0.0,
            vel_y: rng.gen_range(6.0..10.0),
            symbol: '│',
            color_index: 5,
            age: 0.0,
            max_age: 2.5,
            delay: rng.gen_range(0.0..1.0),
            kind: ParticleKind::Rain,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.delay <= 0.0
    }

    /// Advance by `dt`; returns false once the particle has expired
    fn update(&mut self, dt: f64) -> bool {
        if self.delay > 0.0 {
            self.delay -= dt;
            return true;
        }
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        match self.kind {
            ParticleKind::Confetti => self.vel_x *= 0.98,
            ParticleKind::Spark => {
                self.vel_x *= 0.9;
                self.vel_y = self.vel_y * 0.9 + 2.0 * dt;
            }
            ParticleKind::Rain => {}
        }
        self.age += dt;
        self.age < self.max_age
    }
}

/// End-of-game particle effects: confetti and fireworks for a win, rain for a loss
#[derive(Debug)]
pub struct CelebrationAnimation {
    pub particles: Vec<Particle>,
    pub enabled: bool,
    pub elapsed: f64,
    pub duration: f64,
    pub is_active: bool,
    pub terminal_width: f64,
    pub terminal_height: f64,
}

impl CelebrationAnimation {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            enabled: true,
            elapsed: 0.0,
            duration: 4.0,
            is_active: false,
            terminal_width: 80.0,
            terminal_height: 24.0,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;
    }

    pub fn start_win(&mut self) {
        let mut rng = rand::thread_rng();
        self.reset();

        for _ in 0..CONFETTI_PIECES {
            self.particles
                .push(Particle::confetti(&mut rng, self.terminal_width));
        }

        for burst in 0..FIREWORK_BURSTS {
            let cx = rng.gen_range(0.0..self.terminal_width.max(1.0));
            let cy = rng.gen_range(0.0..(self.terminal_height * 0.5).max(1.0));
            let color = rng.gen_range(0..8);
            let delay = burst as f64 * 0.4;
            for spark in 0..SPARKS_PER_BURST {
                let angle = TAU * spark as f64 / SPARKS_PER_BURST as f64;
                self.particles
                    .push(Particle::spark(&mut rng, cx, cy, angle, delay, color));
            }
        }
    }

    pub fn start_loss(&mut self) {
        let mut rng = rand::thread_rng();
        self.reset();
        for _ in 0..RAIN_DROPS {
            self.particles.push(Particle::rain(&mut rng, self.terminal_width));
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    fn reset(&mut self) {
        self.particles.clear();
        self.elapsed = 0.0;
        self.is_active = true;
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        self.elapsed += STEP;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let (width, height) = (self.terminal_width, self.terminal_height);
        self.particles.retain_mut(|p| {
            let alive = p.update(STEP);
            let off_screen = p.y > height + 2.0 || p.x < -2.0 || p.x > width + 2.0;
            alive && !off_screen
        });
    }
}

impl Default for CelebrationAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeListener for CelebrationAnimation {
    fn on_finished(&mut self, summary: &SessionSummary, _new_high_score: bool) {
        if !self.enabled {
            return;
        }
        if summary.result.is_win() {
            self.start_win();
        } else {
            self.start_loss();
        }
    }
}
