use cachestat::ratio::compute_ratio;

#[test]
fn test_normal_interval() {
    let s = compute_ratio(20, 100, 5, 2);
    assert_eq!(s.total, 95);
    assert_eq!(s.misses, 18);
    assert_eq!(s.hits, 77);
    assert!((s.hit_ratio - 77.0 / 95.0 * 100.0).abs() < 1e-9);
    assert!((s.hit_ratio - 81.05).abs() < 0.01);
}

#[test]
fn test_read_ahead_overcount_attributes_interval_to_misses() {
    // misses = 100 - 5 = 95 exceeds total = 80 - 10 = 70
    let s = compute_ratio(100, 80, 10, 5);
    assert_eq!(s.total, 70);
    assert_eq!(s.misses, 70);
    assert_eq!(s.hits, 0);
    assert_eq!(s.hit_ratio, 0.0);
}

#[test]
fn test_total_clamped_before_hits_are_derived() {
    // total = max(0, 3 - 10) = 0, misses = 5, hits = -5 -> corrected to 0/0
    let s = compute_ratio(5, 3, 10, 0);
    assert_eq!(s.total, 0);
    assert_eq!(s.misses, 0);
    assert_eq!(s.hits, 0);
    assert_eq!(s.hit_ratio, 0.0);
}

#[test]
fn test_total_is_plain_difference_when_accesses_dominate() {
    for (mpa, mbd) in [(0u64, 0u64), (10, 0), (10, 10), (1_000, 999), (u64::MAX, 1)] {
        let s = compute_ratio(0, mpa, mbd, 0);
        assert_eq!(s.total, mpa - mbd);
    }
}

#[test]
fn test_misses_clamped_when_dirtying_exceeds_inserts() {
    for (apcl, apd) in [(0u64, 1u64), (5, 6), (1, 1_000_000), (0, u64::MAX)] {
        let s = compute_ratio(apcl, 50, 0, apd);
        assert_eq!(s.misses, 0);
        assert_eq!(s.hits, 50);
    }
}

#[test]
fn test_zero_total_never_divides() {
    for apcl in [0u64, 1, 1_000] {
        let s = compute_ratio(apcl, 7, 7, 0);
        assert_eq!(s.total, 0);
        assert_eq!(s.hit_ratio, 0.0);
    }
}

#[test]
fn test_ratio_stays_in_bounds() {
    let inputs = [0u64, 1, 2, 17, 100, 4096, u64::MAX / 2, u64::MAX];
    for &apcl in &inputs {
        for &mpa in &inputs {
            for &mbd in &inputs {
                for &apd in &inputs {
                    let s = compute_ratio(apcl, mpa, mbd, apd);
                    assert!((0.0..=100.0).contains(&s.hit_ratio), "{apcl} {mpa} {mbd} {apd}");
                    assert_eq!(s.hits + s.misses, s.total);
                }
            }
        }
    }
}
