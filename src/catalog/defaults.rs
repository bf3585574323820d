use super::types::{
    Difficulty, Move, MoveCategory, OpponentProfile, Strategy, TimingSpec, TimingZones,
};
use super::{MoveCatalog, OpponentRoster};
use std::collections::HashMap;

#[allow(clippy::too_many_arguments)]
fn make_move(
    id: &str,
    name: &str,
    category: MoveCategory,
    energy_cost: u32,
    cooldown: u32,
    power: u32,
    color: &str,
    difficulty: Difficulty,
    timing: TimingSpec,
) -> Move {
    Move {
        id: id.to_string(),
        name: name.to_string(),
        category,
        energy_cost,
        cooldown,
        power,
        color: color.to_string(),
        difficulty,
        timing,
    }
}

/// Built-in algorithm-themed moves.
pub fn default_catalog() -> MoveCatalog {
    MoveCatalog::new(vec![
        // Free filler attack, never timed.
        make_move(
            "linear_scan",
            "Linear Scan",
            MoveCategory::Offensive,
            0,
            0,
            8,
            "#9ca3af",
            Difficulty::Easy,
            TimingSpec::Disabled,
        ),
        make_move(
            "binary_search",
            "Binary Search",
            MoveCategory::Offensive,
            10,
            2,
            16,
            "#60a5fa",
            Difficulty::Easy,
            TimingSpec::Single {
                zones: TimingZones::centered(50.0, 5.0, 12.0, 22.0),
            },
        ),
        make_move(
            "quick_sort",
            "Quick Sort",
            MoveCategory::Offensive,
            25,
            3,
            30,
            "#f97316",
            Difficulty::Hard,
            TimingSpec::Single {
                zones: TimingZones::centered(70.0, 3.0, 8.0, 15.0),
            },
        ),
        make_move(
            "merge_sort",
            "Merge Sort",
            MoveCategory::Offensive,
            20,
            3,
            26,
            "#a855f7",
            Difficulty::Medium,
            TimingSpec::Multi {
                stages: vec![
                    TimingZones::centered(30.0, 4.0, 10.0, 18.0),
                    TimingZones::centered(70.0, 4.0, 10.0, 18.0),
                ],
            },
        ),
        make_move(
            "dijkstra",
            "Dijkstra's Path",
            MoveCategory::Offensive,
            35,
            4,
            42,
            "#ef4444",
            Difficulty::Expert,
            TimingSpec::Multi {
                stages: vec![
                    TimingZones::centered(25.0, 3.0, 7.0, 12.0),
                    TimingZones::centered(50.0, 3.0, 7.0, 12.0),
                    TimingZones::centered(75.0, 3.0, 7.0, 12.0),
                ],
            },
        ),
        make_move(
            "garbage_collect",
            "Garbage Collect",
            MoveCategory::Defensive,
            15,
            3,
            18,
            "#22c55e",
            Difficulty::Easy,
            TimingSpec::Single {
                zones: TimingZones::centered(50.0, 6.0, 14.0, 25.0),
            },
        ),
        make_move(
            "memoize",
            "Memoize",
            MoveCategory::Defensive,
            20,
            4,
            14,
            "#14b8a6",
            Difficulty::Medium,
            TimingSpec::Disabled,
        ),
    ])
}

/// Built-in AI opponents, ordered by difficulty.
pub fn default_roster() -> OpponentRoster {
    OpponentRoster::new(vec![
        OpponentProfile {
            id: "bubble_bot".to_string(),
            name: "Bubble Bot".to_string(),
            max_health: 80,
            max_energy: 60,
            energy_regen: None,
            move_ids: vec![
                "linear_scan".to_string(),
                "binary_search".to_string(),
                "garbage_collect".to_string(),
            ],
            strategy: Strategy::Aggressive,
            default_accuracy: 0.45,
            timing_accuracy: HashMap::new(),
        },
        OpponentProfile {
            id: "heap_hydra".to_string(),
            name: "Heap Hydra".to_string(),
            max_health: 120,
            max_energy: 80,
            energy_regen: None,
            move_ids: vec![
                "linear_scan".to_string(),
                "binary_search".to_string(),
                "merge_sort".to_string(),
                "garbage_collect".to_string(),
            ],
            strategy: Strategy::Balanced,
            default_accuracy: 0.6,
            timing_accuracy: HashMap::from([("merge_sort".to_string(), 0.5)]),
        },
        OpponentProfile {
            id: "turing_titan".to_string(),
            name: "Turing Titan".to_string(),
            max_health: 160,
            max_energy: 100,
            energy_regen: Some(15),
            move_ids: vec![
                "linear_scan".to_string(),
                "quick_sort".to_string(),
                "merge_sort".to_string(),
                "dijkstra".to_string(),
                "memoize".to_string(),
            ],
            strategy: Strategy::Tactical,
            default_accuracy: 0.8,
            timing_accuracy: HashMap::from([("dijkstra".to_string(), 0.65)]),
        },
    ])
}
