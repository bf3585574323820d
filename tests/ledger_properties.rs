use algo_duel::catalog::default_catalog;
use algo_duel::engine::ledger::ResourceLedger;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum LedgerOp {
    Damage(u32),
    Heal(u32),
    Spend(usize),
    Regenerate(u32),
    Cooldown(usize, u32),
    Tick,
}

fn ledger_op(move_count: usize) -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (0u32..200).prop_map(LedgerOp::Damage),
        (0u32..200).prop_map(LedgerOp::Heal),
        (0..move_count).prop_map(LedgerOp::Spend),
        (0u32..50).prop_map(LedgerOp::Regenerate),
        ((0..move_count), 0u32..6).prop_map(|(m, n)| LedgerOp::Cooldown(m, n)),
        Just(LedgerOp::Tick),
    ]
}

proptest! {
    #[test]
    fn resources_stay_in_bounds(
        max_health in 1u32..300,
        max_energy in 0u32..150,
        ops in prop::collection::vec(ledger_op(default_catalog().moves.len()), 0..80),
    ) {
        let catalog = default_catalog();
        let mut ledger = ResourceLedger::new(max_health, max_energy);
        for op in ops {
            match op {
                LedgerOp::Damage(n) => ledger.apply_damage(n),
                LedgerOp::Heal(n) => {
                    let before = ledger.health();
                    let restored = ledger.heal(n);
                    prop_assert_eq!(ledger.health(), before + restored);
                }
                LedgerOp::Spend(i) => {
                    let mv = &catalog.moves[i];
                    if ledger.can_afford(mv) {
                        let before = ledger.energy();
                        ledger.consume_energy(mv);
                        prop_assert_eq!(ledger.energy(), before - mv.energy_cost);
                    }
                }
                LedgerOp::Regenerate(n) => ledger.regenerate(n, max_energy),
                LedgerOp::Cooldown(i, n) => ledger.set_cooldown(&catalog.moves[i].id, n),
                LedgerOp::Tick => ledger.tick_cooldowns(),
            }
            prop_assert!(ledger.health() <= max_health);
            prop_assert!(ledger.energy() <= max_energy);
            prop_assert!(ledger.cooldowns().values().all(|turns| *turns > 0));
        }
    }

    #[test]
    fn cooldowns_drop_by_exactly_one_per_tick(
        lengths in prop::collection::vec(0u32..8, 1..7),
    ) {
        let catalog = default_catalog();
        let mut ledger = ResourceLedger::new(100, 100);
        for (mv, length) in catalog.moves.iter().zip(&lengths) {
            ledger.set_cooldown(&mv.id, *length);
        }
        let longest = lengths.iter().copied().max().unwrap_or(0);
        for _ in 0..longest {
            let before = ledger.cooldowns();
            ledger.tick_cooldowns();
            for (id, turns) in before {
                prop_assert_eq!(ledger.cooldown_of(&id), turns - 1);
            }
        }
        prop_assert!(ledger.cooldowns().is_empty());
    }
}
