use player_sheets::performance::{FeedbackCategory, evaluate, win_percentage};

#[test]
fn test_no_matches_played() {
    for won in [0.0, 3.0, 12.0] {
        assert_eq!(evaluate(0.0, won), FeedbackCategory::NoData);
    }
    assert_eq!(
        FeedbackCategory::NoData.message(),
        "No matches played yet. Performance cannot be evaluated."
    );
}

#[test]
fn test_exact_thresholds() {
    assert_eq!(evaluate(10.0, 8.0), FeedbackCategory::Excellent);
    assert_eq!(evaluate(10.0, 6.0), FeedbackCategory::Good);
    assert_eq!(evaluate(10.0, 4.0), FeedbackCategory::Fair);
    assert_eq!(evaluate(10.0, 3.0), FeedbackCategory::NeedsImprovement);
    assert_eq!(evaluate(10.0, 10.0), FeedbackCategory::Excellent);
    println!("✓ Threshold boundaries are inclusive");
}

#[test]
fn test_more_wins_never_worse() {
    for played in 1..=30 {
        let played = played as f64;
        let mut previous = evaluate(played, 0.0);
        for won in 1..=played as u32 {
            let current = evaluate(played, won as f64);
            assert!(current >= previous, "{} of {} dropped a tier", won, played);
            previous = current;
        }
    }
}

#[test]
fn test_unchecked_inputs() {
    // Impossible counts still evaluate
    assert_eq!(win_percentage(5.0, 10.0), Some(200.0));
    assert_eq!(evaluate(5.0, 10.0), FeedbackCategory::Excellent);
    assert_eq!(evaluate(5.0, -1.0), FeedbackCategory::NeedsImprovement);
}
