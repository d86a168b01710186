use nalgebra::Vector2;
use rand::Rng;

use crate::config::SpawnCharacteristics;

/// Uniform spawn point inside the configured x and height ranges.
pub fn spawn_point<R: Rng + ?Sized>(spawn: &SpawnCharacteristics, rng: &mut R) -> Vector2<f64> {
    let [x_lo, x_hi] = spawn.x_range;
    let [h_lo, h_hi] = spawn.height_range;
    Vector2::new(rng.gen_range(x_lo..=x_hi), rng.gen_range(h_lo..=h_hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawn_stays_in_range() {
        let spawn = SpawnCharacteristics::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let p = spawn_point(&spawn, &mut rng);
            assert!((-300.0..=300.0).contains(&p.x), "x = {}", p.x);
            assert!((300.0..=1000.0).contains(&p.y), "y = {}", p.y);
        }
    }

    #[test]
    fn degenerate_range_is_a_fixed_point() {
        let spawn = SpawnCharacteristics {
            height_range: [50.0, 50.0],
            x_range: [1.5, 1.5],
        };
        let p = spawn_point(&spawn, &mut StdRng::seed_from_u64(1));
        assert_eq!(p, Vector2::new(1.5, 50.0));
    }
}
