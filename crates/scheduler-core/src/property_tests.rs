//! Property-based checks over random tick sequences, covering the invariants enumerated in
//! the design spec: lane bookkeeping, processed/throughput ordering, and batch id shape.

use proptest::prelude::*;
use regex::Regex;

use crate::color::Color;
use crate::scheduler::Scheduler;
use crate::topology::BufferId;

fn color_strategy() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::C1),
        Just(Color::C2),
        Just(Color::C3),
        Just(Color::C4),
        Just(Color::C5),
        Just(Color::C6),
        Just(Color::C7),
        Just(Color::C8),
        Just(Color::C9),
        Just(Color::C10),
        Just(Color::C11),
        Just(Color::C12),
    ]
}

proptest! {
    #[test]
    fn lane_invariants_hold_after_random_admissions(colors in prop::collection::vec(color_strategy(), 1..200)) {
        let mut sched = Scheduler::new();
        for (i, color) in colors.into_iter().enumerate() {
            let _ = sched.assign_new_vehicle(i as u64, color);
            for id in BufferId::ALL {
                let lane = &sched.lanes[&id];
                prop_assert!(lane.current_occupancy <= lane.capacity);
                prop_assert_eq!(lane.current_occupancy, lane.vehicles.len());
                let sum: usize = lane.color_counts.values().sum();
                prop_assert_eq!(sum, lane.current_occupancy);
                prop_assert_eq!(lane.current_color.is_none(), lane.current_occupancy == 0);
            }
        }
    }

    #[test]
    fn processed_count_never_falls_below_throughput(colors in prop::collection::vec(color_strategy(), 1..300)) {
        let mut sched = Scheduler::new();
        for (i, color) in colors.into_iter().enumerate() {
            let _ = sched.assign_new_vehicle(i as u64, color);
            if i % 3 == 0 {
                sched.run_conveyor();
            }
            prop_assert!(sched.metrics.vehicles_processed >= sched.metrics.throughput);
        }
    }

    #[test]
    fn batch_ids_match_the_canonical_format(colors in prop::collection::vec(color_strategy(), 1..100)) {
        let re = Regex::new(r"^B-C\d+-\d{3}$").unwrap();
        let mut sched = Scheduler::new();
        for (i, color) in colors.into_iter().enumerate() {
            if let Ok(outcome) = sched.assign_new_vehicle(i as u64, color) {
                prop_assert!(re.is_match(&outcome.batch_id));
            }
        }
    }

    #[test]
    fn unavailable_lane_admits_nothing_while_off(colors in prop::collection::vec(color_strategy(), 1..50)) {
        let mut sched = Scheduler::new();
        sched.set_maintenance(BufferId::L1, false);
        for (i, color) in colors.into_iter().enumerate() {
            let before = sched.lanes[&BufferId::L1].current_occupancy;
            let _ = sched.assign_new_vehicle(i as u64, color);
            let after = sched.lanes[&BufferId::L1].current_occupancy;
            prop_assert_eq!(before, after);
        }
    }
}
