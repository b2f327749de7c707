use rand::Rng;

use crate::engine::game_data::{Catalog, CatchWeights, Category};

/// Outcome of a single cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catch {
    pub category: Category,
    pub species: String,
}

/// Effective pool weights with the rod bonus applied.
///
/// The bonus only ever lands on the common pool. Rare and junk keep their raw
/// weights, so a better rod grows the total and shrinks their share.
pub fn effective_weights(weights: CatchWeights, rod_bonus: u32) -> (u64, u64, u64) {
    (
        u64::from(weights.common) + u64::from(rod_bonus),
        u64::from(weights.rare),
        u64::from(weights.junk),
    )
}

/// Maps a roll in `[0, total)` onto a category.
pub fn category_for_roll(weights: CatchWeights, rod_bonus: u32, roll: u64) -> Category {
    let (common, rare, _junk) = effective_weights(weights, rod_bonus);
    if roll < common {
        Category::Common
    } else if roll < common + rare {
        Category::Rare
    } else {
        Category::Junk
    }
}

/// Draws one catch for a player holding `rod`.
pub fn resolve_catch<R: Rng + ?Sized>(catalog: &Catalog, rod: &str, rng: &mut R) -> Catch {
    let bonus = catalog.rod_bonus_for(rod);
    let (common, rare, junk) = effective_weights(catalog.weights(), bonus);
    let total = common + rare + junk;

    let roll = rng.gen_range(0..total);
    let category = category_for_roll(catalog.weights(), bonus, roll);

    let pool = catalog.pool(category);
    let species = pool[rng.gen_range(0..pool.len())].clone();

    Catch { category, species }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WEIGHTS: CatchWeights = CatchWeights { common: 70, rare: 5, junk: 25 };

    fn shares(catalog: &Catalog, rod: &str, samples: u32) -> (f64, f64, f64) {
        let mut rng = StdRng::seed_from_u64(42);
        let (mut common, mut rare, mut junk) = (0u32, 0u32, 0u32);
        for _ in 0..samples {
            match resolve_catch(catalog, rod, &mut rng).category {
                Category::Common => common += 1,
                Category::Rare => rare += 1,
                Category::Junk => junk += 1,
            }
        }
        let n = samples as f64;
        (common as f64 / n, rare as f64 / n, junk as f64 / n)
    }

    #[test]
    fn test_roll_boundaries_without_bonus() {
        assert_eq!(category_for_roll(WEIGHTS, 0, 0), Category::Common);
        assert_eq!(category_for_roll(WEIGHTS, 0, 69), Category::Common);
        assert_eq!(category_for_roll(WEIGHTS, 0, 70), Category::Rare);
        assert_eq!(category_for_roll(WEIGHTS, 0, 74), Category::Rare);
        assert_eq!(category_for_roll(WEIGHTS, 0, 75), Category::Junk);
        assert_eq!(category_for_roll(WEIGHTS, 0, 99), Category::Junk);
    }

    #[test]
    fn test_bonus_extends_common_only() {
        assert_eq!(effective_weights(WEIGHTS, 10), (80, 5, 25));
        assert_eq!(category_for_roll(WEIGHTS, 10, 79), Category::Common);
        // Rare keeps its full width of 5 after the shifted common band.
        assert_eq!(category_for_roll(WEIGHTS, 10, 80), Category::Rare);
        assert_eq!(category_for_roll(WEIGHTS, 10, 84), Category::Rare);
        assert_eq!(category_for_roll(WEIGHTS, 10, 85), Category::Junk);
        assert_eq!(category_for_roll(WEIGHTS, 10, 109), Category::Junk);
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let catalog = Catalog::default();
        let (common, rare, junk) = shares(&catalog, "Vara Básica", 50_000);
        assert!((common - 0.70).abs() < 0.015, "common share {common}");
        assert!((rare - 0.05).abs() < 0.006, "rare share {rare}");
        assert!((junk - 0.25).abs() < 0.015, "junk share {junk}");
    }

    #[test]
    fn test_advanced_rod_shifts_mass_to_common() {
        let catalog = Catalog::default();
        let (base_common, _, _) = shares(&catalog, "Vara Básica", 50_000);
        let (adv_common, adv_rare, adv_junk) = shares(&catalog, "Vara Avançada", 50_000);

        assert!(adv_common > base_common);
        // Expected 80/110, 5/110 and 25/110.
        assert!((adv_common - 80.0 / 110.0).abs() < 0.015);
        assert!((adv_rare - 5.0 / 110.0).abs() < 0.006);
        assert!((adv_junk - 25.0 / 110.0).abs() < 0.015);
    }

    #[test]
    fn test_species_comes_from_matching_pool() {
        let catalog = Catalog::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let catch = resolve_catch(&catalog, "Vara Intermediária", &mut rng);
            assert!(catalog.pool(catch.category).contains(&catch.species));
        }
    }

    #[test]
    fn test_same_seed_same_catches() {
        let catalog = Catalog::default();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                resolve_catch(&catalog, "Vara Básica", &mut a),
                resolve_catch(&catalog, "Vara Básica", &mut b)
            );
        }
    }

    #[test]
    fn test_rod_bonus_strictly_lowers_rare_share() {
        let weights = Catalog::default().weights();
        for bonus in [5, 10] {
            let (base_common, base_rare, base_junk) = effective_weights(weights, 0);
            let (common, rare, junk) = effective_weights(weights, bonus);
            assert_eq!(rare, base_rare);
            assert_eq!(junk, base_junk);
            assert_eq!(common, base_common + u64::from(bonus));
            // rare / (total + bonus) < rare / total, compared without division.
            let base_total = base_common + base_rare + base_junk;
            let total = common + rare + junk;
            assert!(rare * base_total < base_rare * total);
        }
    }
}
