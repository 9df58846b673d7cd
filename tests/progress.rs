use pbuffer::Stats;
use pbuffer::progress::{Progress, ProgressLine, humanise, render};

fn sample() -> Stats {
    Stats {
        bytes_read: 1_048_576,
        buffered: 65_536,
        ceiling: 1_048_576,
        depth: 1,
        reads: 16,
        writes: 15,
    }
}

#[test]
fn test_humanise_small_values_are_padded() {
    assert_eq!(humanise(0), "    0");
    assert_eq!(humanise(7), "    7");
    assert_eq!(humanise(1023), " 1023");
}

#[test]
fn test_humanise_keeps_four_significant_digits() {
    assert_eq!(humanise(1024), "1.00k");
    assert_eq!(humanise(1536), "1.50k");
    assert_eq!(humanise(12_800), "12.5k");
    assert_eq!(humanise(126_362), " 123k");
    assert_eq!(humanise(1000 * 1024), "1000k");
    assert_eq!(humanise(1_048_576), "1.00M");
    assert_eq!(humanise(3 * 1024 * 1024 * 1024), "3.00G");
    assert_eq!(humanise(u64::MAX), "16.0E");
}

#[test]
fn test_humanise_is_five_columns() {
    for value in [0, 999, 1024, 50_000, 1 << 30, 5 << 40, u64::MAX] {
        assert_eq!(humanise(value).chars().count(), 5, "width of {value}");
    }
}

#[test]
fn test_render_plain() {
    assert_eq!(
        render(&sample(), false),
        "\rRead:        1048576, Buffer:          65536   6% (1), \
         Reads:             16, Writes:             15"
    );
}

#[test]
fn test_render_human_readable() {
    assert_eq!(
        render(&sample(), true),
        "\rRead: 1.00M, Buffer: 64.0k   6% (1), Reads:             16, Writes:             15"
    );
}

#[test]
fn test_render_full_queue() {
    let stats = Stats {
        buffered: 1_048_576,
        depth: 16,
        ..sample()
    };

    assert!(render(&stats, true).contains("Buffer: 1.00M 100% (16)"));
}

#[test]
fn test_progress_line_writes_each_report() {
    let mut line = ProgressLine::new(Vec::new(), true);

    line.report(&sample());
    line.report(&Stats {
        bytes_read: 2048,
        ..sample()
    });

    let out = String::from_utf8(line.into_inner()).unwrap();
    assert_eq!(out.matches('\r').count(), 2);
    assert!(out.ends_with(&render(
        &Stats {
            bytes_read: 2048,
            ..sample()
        },
        true
    )));
    assert!(!out.contains('\n'), "the line overwrites itself");
}
