use std::fmt;

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Источник равномерно распределённых индексов для выбора участника
/// очереди.
pub trait IndexSource: Send + Sync {
    /// Возвращает индекс из `0..len`. `len` всегда больше нуля.
    fn pick(
        &self,
        len: usize,
    ) -> usize;
}

/// Источник на основе потокового `rand::thread_rng`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn pick(
        &self,
        len: usize,
    ) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Детерминированный источник с фиксированным зерном.
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl IndexSource for SeededSource {
    fn pick(
        &self,
        len: usize,
    ) -> usize {
        self.rng.lock().gen_range(0..len)
    }
}

impl fmt::Debug for SeededSource {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SeededSource").finish_non_exhaustive()
    }
}
