use dcmviewer::fit::r2star_map;
use dcmviewer::utils::{series_title, summary_header, summary_row};
use dcmviewer::{AsyncLoadPipeline, FitSettings, LoadEvent, RoiResolver, SeriesIndex};
use std::path::PathBuf;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let mut args = std::env::args().skip(1).peekable();
    if args.peek().is_some_and(|arg| arg == "--version" || arg == "-V") {
        println!("dcmviewer ({})", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    let directory = args
        .next()
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let r2star_series = match args.next().map(|raw| raw.parse::<u32>()) {
        None => None,
        Some(Ok(number)) => Some(number),
        Some(Err(err)) => {
            eprintln!("Invalid series number: {err}");
            return ExitCode::from(2);
        }
    };

    let (mut pipeline, events) = AsyncLoadPipeline::new();
    let load = pipeline.start(&directory);

    let series = loop {
        let Ok(event) = events.recv() else {
            eprintln!("Load worker stopped without a result");
            return ExitCode::FAILURE;
        };
        if event.load() != load {
            continue;
        }
        match event {
            LoadEvent::Progress { count, .. } => {
                log::debug!("Read {count} dicoms from {}", directory.display());
            }
            LoadEvent::Ready { series, .. } => break series,
            LoadEvent::Failed { error, .. } => {
                eprintln!("{error}");
                return ExitCode::FAILURE;
            }
        }
    };

    let resolver = RoiResolver::new();
    println!("{}", summary_header());
    for dicom_series in series.iter() {
        match SeriesIndex::summarize(dicom_series, &resolver) {
            Ok(summary) => println!("{}", summary_row(&summary)),
            Err(err) => log::error!("{err}"),
        }
    }

    if let Some(number) = r2star_series {
        let Some(dicom_series) = series.get(number) else {
            eprintln!("Series {number} not found in {}", directory.display());
            return ExitCode::FAILURE;
        };
        let settings = match FitSettings::from_env() {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::from(2);
            }
        };
        match r2star_map(dicom_series, &settings) {
            Ok(map) => println!(
                "{}: R2* fitted at {} of {} voxels (echo times {:?} s)",
                series_title(dicom_series),
                map.result.valid_count(),
                map.result.len(),
                map.echo_times
            ),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
