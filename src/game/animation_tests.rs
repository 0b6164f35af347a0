//! Tests for the puppy pose animation.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::game::animation::{PuppyAnimation, PuppyAnimationState};

    #[test]
    fn starts_idling_at_a_neutral_pose() {
        let animation = PuppyAnimation::new();
        assert_eq!(animation.state(), PuppyAnimationState::Idling);

        let pose = animation.pose();
        assert_eq!(pose.scale.x, 1.0);
        assert_eq!(pose.scale.y, 1.0);
        assert_eq!(pose.hop, 0.0);
        assert_eq!(pose.tilt, 0.0);
    }

    #[test]
    fn idle_breath_squashes_and_widens_in_opposition() {
        let mut animation = PuppyAnimation::new();
        // Half the breath cycle: fully inhaled.
        animation.update_timer(Duration::from_millis(1250));
        let pose = animation.pose();
        assert!((pose.scale.x - 1.03).abs() < 1e-3);
        assert!((pose.scale.y - 0.97).abs() < 1e-3);
        assert_eq!(pose.hop, 0.0);
    }

    #[test]
    fn update_state_restarts_the_clock_only_on_change() {
        let mut animation = PuppyAnimation::new();
        animation.update_timer(Duration::from_millis(500));
        let before = animation.pose();

        // Same state: the clock keeps running.
        animation.update_state(PuppyAnimationState::Idling);
        assert_eq!(animation.pose(), before);

        // New state: fresh clock, neutral hop.
        animation.update_state(PuppyAnimationState::Running);
        assert_eq!(animation.state(), PuppyAnimationState::Running);
        assert_eq!(animation.pose().hop, 0.0);
    }

    #[test]
    fn run_cycle_hops_and_lands_twice() {
        let mut animation = PuppyAnimation::new();
        animation.update_state(PuppyAnimationState::Running);

        // Quarter cycle: top of the first, higher hop, leaning forward.
        animation.update_timer(Duration::from_micros(87_500));
        let pose = animation.pose();
        assert!((pose.hop - 20.0).abs() < 1e-3);
        assert!(pose.tilt > 0.0);
        assert!(!animation.just_stepped());

        // Crossing the half-cycle is the first landing.
        animation.update_timer(Duration::from_micros(100_000));
        assert!(animation.just_stepped());

        // Three quarters: top of the second, lower hop, leaning back.
        animation.update_timer(Duration::from_micros(75_000));
        let pose = animation.pose();
        assert!((pose.hop - 15.0).abs() < 1e-3);
        assert!(pose.tilt < 0.0);
        assert!(!animation.just_stepped());

        // Wrapping into the next cycle is the second landing.
        animation.update_timer(Duration::from_micros(100_000));
        assert!(animation.just_stepped());
    }

    #[test]
    fn startle_pop_settles_back_to_neutral() {
        let mut animation = PuppyAnimation::new();
        animation.update_state(PuppyAnimationState::Reacting);

        // 40% in: the biggest pop of the one-shot.
        animation.update_timer(Duration::from_millis(160));
        let pose = animation.pose();
        assert!((pose.scale.x - 1.2).abs() < 1e-3);
        assert!((pose.hop - 10.0).abs() < 1e-3);

        // One-shot complete: back on the ground at neutral scale.
        animation.update_timer(Duration::from_millis(240));
        let pose = animation.pose();
        assert!((pose.scale.x - 1.0).abs() < 1e-3);
        assert_eq!(pose.hop, 0.0);

        // It holds the final pose rather than wrapping.
        animation.update_timer(Duration::from_millis(400));
        assert_eq!(animation.pose(), pose);
        assert!(!animation.just_stepped());
    }

    #[test]
    fn footfalls_only_happen_while_running() {
        let mut animation = PuppyAnimation::new();
        // Long idle and reacting stretches never step.
        for _ in 0..20 {
            animation.update_timer(Duration::from_millis(100));
            assert!(!animation.just_stepped());
        }
        animation.update_state(PuppyAnimationState::Reacting);
        for _ in 0..20 {
            animation.update_timer(Duration::from_millis(100));
            assert!(!animation.just_stepped());
        }
    }
}
