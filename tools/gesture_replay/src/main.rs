use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use soundslide::{
    config::{DOUBLE_TAP_WINDOW_TICKS, MAX_CHANNELS, SLIDE_QUEUE_LEN},
    gesture::Tick,
    hid::{TransportError, HID_REPORT_LEN},
    DeviceConfiguration, GestureDecoder, HidEndpoint, HidReport, ReportTransport,
    SensorSnapshot, SlideFunction,
};

const TRACE_HEADER_PREFIX: &str = "strip_trace,tick,";

struct ReplayFrame {
    tick: Tick,
    snapshot: SensorSnapshot,
}

/// Host side of the interrupt endpoint: takes every report immediately.
#[derive(Default)]
struct CapturedReports {
    pending: Vec<HidReport>,
}

impl ReportTransport for CapturedReports {
    fn start_tx(&mut self, report: &HidReport) -> Result<(), TransportError> {
        self.pending.push(*report);
        Ok(())
    }
}

type ReportLine = (Tick, HidReport);

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;
    let mut flip = false;
    let mut scale = 1u8;
    let mut function = SlideFunction::Volume;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "--scale" => {
                idx += 1;
                let Some(raw) = args.get(idx) else {
                    return Err("missing value after --scale".into());
                };
                scale = raw
                    .parse::<u8>()
                    .map_err(|e| format!("invalid --scale '{raw}': {e}"))?;
            }
            "--function" => {
                idx += 1;
                let Some(raw) = args.get(idx) else {
                    return Err("missing value after --function".into());
                };
                function = parse_function(raw)?;
            }
            "--flip" => flip = true,
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let config = DeviceConfiguration::new(flip, scale, function).map_err(|e| e.to_string())?;
    let trace_path = trace_path.ok_or_else(usage)?;
    let frames = parse_trace(&trace_path)?;
    let reports = replay(&frames, &config);

    println!("report,tick,b0,b1,b2,b3");
    for (tick, report) in &reports {
        println!("report,{},{}", tick, hex_bytes(report));
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected(&expect_path)?;
        if reports != expected {
            eprintln!("expected reports: {}", join_reports(&expected));
            eprintln!("actual reports:   {}", join_reports(&reports));
            return Err("report sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: gesture_replay <trace.csv> [--function volume|brightness|scroll] [--scale N] [--flip] [--expect expected.txt]"
        .to_string()
}

/// Runs the frames through the decoder, filling tick gaps with an untouched
/// strip and a silent tail long enough for pending taps and slides to flush.
fn replay(frames: &[ReplayFrame], config: &DeviceConfiguration) -> Vec<ReportLine> {
    let mut decoder = GestureDecoder::new();
    let mut endpoint = HidEndpoint::new(CapturedReports::default());
    let silent = SensorSnapshot::default();
    let mut out = Vec::new();

    let mut step = |decoder: &mut GestureDecoder, snapshot: &SensorSnapshot| {
        let output = decoder.tick_snapshot(snapshot, config, &mut endpoint);
        while endpoint.sequencer().in_flight() {
            endpoint.transfer_complete();
        }
        out.extend(
            endpoint
                .transport_mut()
                .pending
                .drain(..)
                .map(|report| (output.tick, report)),
        );
    };

    for frame in frames {
        while decoder.now().wrapping_add(1) < frame.tick {
            step(&mut decoder, &silent);
        }
        step(&mut decoder, &frame.snapshot);
    }

    let tail = DOUBLE_TAP_WINDOW_TICKS + SLIDE_QUEUE_LEN as u32 + 1;
    for _ in 0..tail {
        step(&mut decoder, &silent);
    }

    out
}

fn parse_function(raw: &str) -> Result<SlideFunction, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "volume" => Ok(SlideFunction::Volume),
        "brightness" => Ok(SlideFunction::Brightness),
        "scroll" => Ok(SlideFunction::Scroll),
        other => Err(format!("unknown slide function: {other}")),
    }
}

fn parse_trace(path: &Path) -> Result<Vec<ReplayFrame>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out: Vec<ReplayFrame> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(TRACE_HEADER_PREFIX) {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts[0].trim() != "strip_trace" {
            continue;
        }
        if parts.len() < 3 {
            return Err(format!(
                "{}:{} invalid trace line, expected tick and at least one channel",
                path.display(),
                line_no
            ));
        }
        if parts.len() - 2 > MAX_CHANNELS {
            return Err(format!(
                "{}:{} too many channels ({}), limit is {}",
                path.display(),
                line_no,
                parts.len() - 2,
                MAX_CHANNELS
            ));
        }

        let tick = parse_field::<Tick>(parts[1], path, line_no, "tick")?;
        if tick == 0 || out.last().is_some_and(|prev| prev.tick >= tick) {
            return Err(format!(
                "{}:{} tick {} is not after the previous frame",
                path.display(),
                line_no,
                tick
            ));
        }

        let mut values = Vec::with_capacity(parts.len() - 2);
        for raw in &parts[2..] {
            values.push(parse_field::<u16>(raw, path, line_no, "channel")?);
        }
        let snapshot = SensorSnapshot::from_slice(&values)
            .map_err(|e| format!("{}:{} {e}", path.display(), line_no))?;

        out.push(ReplayFrame { tick, snapshot });
    }

    Ok(out)
}

fn parse_expected(path: &Path) -> Result<Vec<ReportLine>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut reports = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = token.split(',').collect();
        if parts.len() != 5 {
            return Err(format!(
                "{}:{} expected tick,b0,b1,b2,b3",
                path.display(),
                line_no
            ));
        }
        let tick = parse_field::<Tick>(parts[0], path, line_no, "tick")?;
        let mut bytes = [0u8; HID_REPORT_LEN];
        for (slot, raw) in bytes.iter_mut().zip(&parts[1..]) {
            *slot = u8::from_str_radix(raw.trim(), 16).map_err(|e| {
                format!(
                    "{}:{} invalid byte '{}': {}",
                    path.display(),
                    line_no,
                    raw.trim(),
                    e
                )
            })?;
        }
        reports.push((tick, HidReport::from_bytes(bytes)));
    }

    Ok(reports)
}

fn hex_bytes(report: &HidReport) -> String {
    report
        .to_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn join_reports(reports: &[ReportLine]) -> String {
    reports
        .iter()
        .map(|(tick, report)| format!("{}:{}", tick, hex_bytes(report)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_field<T>(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}
