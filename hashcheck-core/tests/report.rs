use hashcheck_core::report::{format_size, summarize, CounterSnapshot};

#[test]
fn summarize_computes_breakdown() {
    let r = summarize(CounterSnapshot { ok: 6, corrupted: 3, missing: 1 }, 10, 1.5, false);
    assert_eq!((r.ok_count, r.corrupted_count, r.missing_count), (6, 3, 1));
    assert!((r.percentages.ok - 60.0).abs() < 1e-9);
    assert!((r.percentages.corrupted - 30.0).abs() < 1e-9);
    assert!((r.percentages.missing - 10.0).abs() < 1e-9);
    assert_eq!(r.tallied(), 10);
    assert!(!r.all_ok());
}

#[test]
fn zero_files_gives_zero_percentages() {
    let r = summarize(CounterSnapshot::default(), 0, 0.0, false);
    assert_eq!(r.percentages.ok, 0.0);
    assert_eq!(r.percentages.corrupted, 0.0);
    assert_eq!(r.percentages.missing, 0.0);
}

#[test]
fn canceled_report_is_never_all_ok() {
    let r = summarize(CounterSnapshot { ok: 2, corrupted: 0, missing: 0 }, 2, 0.1, true);
    assert!(!r.all_ok());
}

#[test]
fn display_renders_final_report() {
    let r = summarize(CounterSnapshot { ok: 3, corrupted: 1, missing: 0 }, 4, 2.0, false);
    let text = r.to_string();
    assert!(text.starts_with("--- FINAL REPORT ---\nFiles: 4\n"), "{text}");
    assert!(text.contains("[OK] Valid: 3 (75.00%)"));
    assert!(text.contains("[ERR] Corrupted: 1 (25.00%)"));
    assert!(text.contains("[?] Missing: 0 (0.00%)"));
    assert!(text.contains("Completed (2.00 s)"));
}

#[test]
fn report_serializes_to_json() {
    let r = summarize(CounterSnapshot { ok: 1, corrupted: 0, missing: 1 }, 2, 0.25, false);
    let v: serde_json::Value = serde_json::to_value(&r).unwrap();
    assert_eq!(v["total_files"], 2);
    assert_eq!(v["missing_count"], 1);
    assert_eq!(v["was_canceled"], false);
    assert_eq!(v["percentages"]["ok"], 50.0);
}

#[test]
fn sizes_use_binary_units() {
    assert_eq!(format_size(0), "0.00 B");
    assert_eq!(format_size(1023), "1023.00 B");
    assert_eq!(format_size(1536), "1.50 KB");
    assert_eq!(format_size(8 << 20), "8.00 MB");
    assert_eq!(format_size(3 << 30), "3.00 GB");
    assert_eq!(format_size(2048 << 30), "2048.00 GB");
}
