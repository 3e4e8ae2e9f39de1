//! One (date, type) pipeline: download, reassemble, normalize, aggregate,
//! archive.

use async_compression::tokio::bufread::GzipDecoder;
use chrono::NaiveDate;
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use frazil_aggregate::{AggregatorSet, FlushedSet};
use frazil_archive::{ArchiveWriter, archive_path, member_name, remove_archives, rows, write_archive};
use frazil_fetch::{DownloadClient, DownloadError, LineAssembler, parse_line, url::object_url};
use frazil_types::{EventType, FrazilError, Resolution, Result};

use crate::PipelineConfig;

/// Number of malformed events in one stream beyond which the pipeline
/// fails instead of silently archiving bars with missing data.
pub const MAX_MALFORMED_EVENTS: u64 = 1_000;

/// How a pipeline ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every resolution's archive was written.
    Archived,
    /// The tick archive already existed; nothing was downloaded.
    Skipped,
}

/// Pipeline stages, traced for observability.
#[derive(Debug, Clone, Copy)]
enum Stage {
    Downloading,
    Streaming,
    Flushing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Downloading => "downloading",
            Self::Streaming => "streaming",
            Self::Flushing => "flushing",
        };
        write!(f, "{s}")
    }
}

/// Runs the pipeline for one (date, type) pair.
///
/// Skips entirely (zero network requests) when the tick archive for the
/// pair already exists. On any failure, and on cancellation, every archive
/// for the pair is deleted across all resolutions before returning, so a
/// retry starts clean rather than serving a truncated archive.
///
/// # Errors
///
/// Returns the error that failed the pipeline; sibling pipelines are
/// unaffected.
pub async fn run_pipeline(
    client: &DownloadClient,
    config: &PipelineConfig,
    date: NaiveDate,
    event_type: EventType,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    let tick_path = archive_path(
        &config.output_root,
        Resolution::Tick,
        &config.instrument,
        date,
        event_type,
    );
    if tick_path.exists() {
        debug!(%date, %event_type, "tick archive present, skipping");
        return Ok(Outcome::Skipped);
    }

    match execute(client, config, date, event_type, cancel).await {
        Ok(()) => Ok(Outcome::Archived),
        Err(e) => {
            match remove_archives(&config.output_root, &config.instrument, date, event_type) {
                Ok(removed) if removed > 0 => {
                    debug!(%date, %event_type, removed, "removed partial archives");
                }
                Ok(_) => {}
                Err(cleanup_err) => {
                    warn!(%date, %event_type, error = %cleanup_err, "cleanup failed");
                }
            }
            Err(e)
        }
    }
}

/// Downloads, streams, and archives; the caller handles cleanup on error.
async fn execute(
    client: &DownloadClient,
    config: &PipelineConfig,
    date: NaiveDate,
    event_type: EventType,
    cancel: &CancellationToken,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(FrazilError::Cancelled);
    }

    let url = object_url(&config.base_url, date, event_type);
    debug!(%date, %event_type, stage = %Stage::Downloading, %url);

    let response = client.fetch(&url).await.map_err(|e| match e {
        DownloadError::Status { status } => FrazilError::Status { status },
        DownloadError::Http(e) => FrazilError::Http(e.to_string()),
    })?;

    let stream = response.bytes_stream().map_err(std::io::Error::other);
    let mut decoder = GzipDecoder::new(StreamReader::new(stream));

    debug!(%date, %event_type, stage = %Stage::Streaming);
    let tick_path = archive_path(
        &config.output_root,
        Resolution::Tick,
        &config.instrument,
        date,
        event_type,
    );
    let member = member_name(date);
    let mut tick_writer = ArchiveWriter::create(&tick_path, &member)?;
    let mut aggregators = AggregatorSet::for_event_type(event_type);

    process_stream(
        &mut decoder,
        date,
        event_type,
        &config.symbol,
        &mut tick_writer,
        &mut aggregators,
        cancel,
    )
    .await?;

    debug!(%date, %event_type, stage = %Stage::Flushing);
    tick_writer.finish()?;
    write_bar_archives(config, date, event_type, aggregators.flush(), &member)?;

    debug!(%date, %event_type, "archived");
    Ok(())
}

/// Consumes the decompressed byte stream: reassembles lines, normalizes
/// events, fans them out to the aggregators and the tick archive.
///
/// Cancellation is observed at every read, the pipeline's only suspension
/// point while streaming. Malformed events are logged and dropped; more
/// than [`MAX_MALFORMED_EVENTS`] of them fails the stream.
#[allow(clippy::too_many_arguments)]
async fn process_stream<R>(
    reader: &mut R,
    date: NaiveDate,
    event_type: EventType,
    symbol: &str,
    tick_writer: &mut ArchiveWriter,
    aggregators: &mut AggregatorSet,
    cancel: &CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut assembler = LineAssembler::new();
    let mut malformed = 0u64;
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = tokio::select! {
            () = cancel.cancelled() => return Err(FrazilError::Cancelled),
            read = reader.read(&mut buf) => read.map_err(classify_read_error)?,
        };
        if n == 0 {
            break;
        }
        for line in assembler.feed(&buf[..n]) {
            handle_line(
                &line,
                date,
                event_type,
                symbol,
                tick_writer,
                aggregators,
                &mut malformed,
            )?;
        }
    }

    // A stream ending without a final terminator still carries one last row
    if let Some(line) = assembler.finish() {
        handle_line(
            &line,
            date,
            event_type,
            symbol,
            tick_writer,
            aggregators,
            &mut malformed,
        )?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_line(
    line: &str,
    date: NaiveDate,
    event_type: EventType,
    symbol: &str,
    tick_writer: &mut ArchiveWriter,
    aggregators: &mut AggregatorSet,
    malformed: &mut u64,
) -> Result<()> {
    match parse_line(line, event_type, symbol) {
        Ok(Some(event)) => {
            tick_writer.write_row(&rows::event(&event))?;
            aggregators.on_event(&event);
        }
        Ok(None) => {}
        Err(e) => {
            *malformed += 1;
            warn!(%date, %event_type, line, error = %e, "malformed event dropped");
            if *malformed > MAX_MALFORMED_EVENTS {
                return Err(FrazilError::TooManyMalformed { count: *malformed });
            }
        }
    }
    Ok(())
}

/// Writes one archive per bar resolution from the flushed aggregators.
fn write_bar_archives(
    config: &PipelineConfig,
    date: NaiveDate,
    event_type: EventType,
    flushed: FlushedSet,
    member: &str,
) -> Result<()> {
    match flushed {
        FlushedSet::Trade(per_resolution) => {
            for (resolution, bars) in per_resolution {
                let path = archive_path(
                    &config.output_root,
                    resolution,
                    &config.instrument,
                    date,
                    event_type,
                );
                write_archive(&path, member, bars.iter().map(rows::trade_bar))?;
            }
        }
        FlushedSet::Quote(per_resolution) => {
            for (resolution, bars) in per_resolution {
                let path = archive_path(
                    &config.output_root,
                    resolution,
                    &config.instrument,
                    date,
                    event_type,
                );
                write_archive(&path, member, bars.iter().map(rows::quote_bar))?;
            }
        }
    }
    Ok(())
}

/// Distinguishes gzip corruption from transport failures surfaced through
/// the stream reader.
fn classify_read_error(e: std::io::Error) -> FrazilError {
    if e.kind() == std::io::ErrorKind::InvalidData {
        FrazilError::Decode(e.to_string())
    } else {
        FrazilError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frazil_archive::ensure_layout;
    use frazil_fetch::ClientConfig;
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, BufReader};

    const TRADE_CSV: &str = "\
timestamp,symbol,side,size,price,tickType,trdMatchID,grossValue,homeNotional,foreignNotional
2018-09-01D00:00:00.000000000,XBTUSD,Buy,10,100,PlusTick,aa,1,1,1
2018-09-01D00:00:00.500000000,XBTUSD,Sell,4,101,MinusTick,bb,1,1,1
2018-09-01D00:01:01.000000000,XBTUSD,Buy,1,102,PlusTick,cc,1,1,1
";

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 9, 1).unwrap()
    }

    fn unroutable_client() -> DownloadClient {
        DownloadClient::new(ClientConfig {
            max_retries: 0,
            ..Default::default()
        })
        .unwrap()
    }

    fn local_config(root: &std::path::Path) -> PipelineConfig {
        // Port 9 (discard) refuses connections; any contact fails fast
        PipelineConfig::new(root).with_base_url("http://127.0.0.1:9/data")
    }

    async fn run_process_stream(
        input: &str,
        config: &PipelineConfig,
        event_type: EventType,
    ) -> Result<AggregatorSet> {
        let date = test_date();
        let tick_path = archive_path(
            &config.output_root,
            Resolution::Tick,
            &config.instrument,
            date,
            event_type,
        );
        let mut tick_writer = ArchiveWriter::create(&tick_path, &member_name(date)).unwrap();
        let mut aggregators = AggregatorSet::for_event_type(event_type);

        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let result = process_stream(
            &mut reader,
            date,
            event_type,
            &config.symbol,
            &mut tick_writer,
            &mut aggregators,
            &CancellationToken::new(),
        )
        .await;
        tick_writer.finish().unwrap();
        result.map(|()| aggregators)
    }

    #[tokio::test]
    async fn test_process_stream_aggregates_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();

        let aggregators = run_process_stream(TRADE_CSV, &config, EventType::Trade)
            .await
            .unwrap();

        let FlushedSet::Trade(per_resolution) = aggregators.flush() else {
            panic!("expected trade bars")
        };
        let (_, second_bars) = per_resolution
            .iter()
            .find(|(r, _)| *r == Resolution::Second)
            .unwrap();
        let first = &second_bars[0];
        assert_eq!(first.bucket_start, 0);
        assert!((first.open - 100.0).abs() < 1e-12);
        assert!((first.close - 101.0).abs() < 1e-12);
        assert!((first.volume - 14.0).abs() < 1e-12);
        assert!((first.orderflow - 6.0).abs() < 1e-12);

        let (_, minute_bars) = per_resolution
            .iter()
            .find(|(r, _)| *r == Resolution::Minute)
            .unwrap();
        assert_eq!(minute_bars.len(), 2);
        assert_eq!(minute_bars[1].bucket_start, 60_000);
        assert!((minute_bars[1].volume - 1.0).abs() < 1e-12);
    }

    fn read_member(path: &std::path::Path) -> String {
        use std::io::Read;
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut content = String::new();
        archive
            .by_index(0)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[tokio::test]
    async fn test_bar_archives_written_per_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();
        let date = test_date();

        let aggregators = run_process_stream(TRADE_CSV, &config, EventType::Trade)
            .await
            .unwrap();
        let member = member_name(date);
        write_bar_archives(&config, date, EventType::Trade, aggregators.flush(), &member)
            .unwrap();

        let bar_path = |resolution| {
            archive_path(
                &config.output_root,
                resolution,
                &config.instrument,
                date,
                EventType::Trade,
            )
        };
        for resolution in Resolution::bar_resolutions() {
            assert!(bar_path(*resolution).exists(), "{resolution} archive missing");
        }

        // Second bars: two buckets, ascending, merge rules applied
        assert_eq!(
            read_member(&bar_path(Resolution::Second)),
            "0,100,101,100,101,14,6\n61000,102,102,102,102,1,1\n"
        );
        assert_eq!(
            read_member(&bar_path(Resolution::Minute)),
            "0,100,101,100,101,14,6\n60000,102,102,102,102,1,1\n"
        );
        // All three trades collapse into one hourly/daily bucket
        assert_eq!(
            read_member(&bar_path(Resolution::Hour)),
            "0,100,102,100,102,15,7\n"
        );
        assert_eq!(
            read_member(&bar_path(Resolution::Daily)),
            "0,100,102,100,102,15,7\n"
        );
    }

    #[tokio::test]
    async fn test_gzip_decode_path() {
        use async_compression::tokio::bufread::GzipEncoder;

        let mut encoder = GzipEncoder::new(BufReader::new(Cursor::new(
            TRADE_CSV.as_bytes().to_vec(),
        )));
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();

        let date = test_date();
        let tick_path = archive_path(
            &config.output_root,
            Resolution::Tick,
            &config.instrument,
            date,
            EventType::Trade,
        );
        let mut tick_writer = ArchiveWriter::create(&tick_path, &member_name(date)).unwrap();
        let mut aggregators = AggregatorSet::for_event_type(EventType::Trade);

        let mut decoder = GzipDecoder::new(BufReader::new(Cursor::new(compressed)));
        process_stream(
            &mut decoder,
            date,
            EventType::Trade,
            &config.symbol,
            &mut tick_writer,
            &mut aggregators,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        tick_writer.finish().unwrap();

        let FlushedSet::Trade(per_resolution) = aggregators.flush() else {
            panic!("expected trade bars")
        };
        let (_, daily) = per_resolution
            .iter()
            .find(|(r, _)| *r == Resolution::Daily)
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert!((daily[0].volume - 15.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_malformed_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();

        let mut input = String::new();
        for _ in 0..=MAX_MALFORMED_EVENTS {
            input.push_str("2018-09-01D00:00:00.000000000,XBTUSD,Buy,oops,100,x,y\n");
        }

        let result = run_process_stream(&input, &config, EventType::Trade).await;
        assert!(matches!(
            result,
            Err(FrazilError::TooManyMalformed { count }) if count == MAX_MALFORMED_EVENTS + 1
        ));
    }

    #[tokio::test]
    async fn test_malformed_below_threshold_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();

        let input = "2018-09-01D00:00:00.000000000,XBTUSD,Buy,oops,100,x,y\n\
                     2018-09-01D00:00:01.000000000,XBTUSD,Buy,10,100,x,y\n";
        let aggregators = run_process_stream(input, &config, EventType::Trade)
            .await
            .unwrap();

        let FlushedSet::Trade(per_resolution) = aggregators.flush() else {
            panic!("expected trade bars")
        };
        let (_, daily) = per_resolution
            .iter()
            .find(|(r, _)| *r == Resolution::Daily)
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert!((daily[0].volume - 10.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_skip_when_tick_archive_exists() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();
        let date = test_date();

        // Pre-existing tick archive marks the pair complete; the base URL is
        // unroutable, so any network contact would fail the run instead.
        let tick_path = archive_path(
            &config.output_root,
            Resolution::Tick,
            &config.instrument,
            date,
            EventType::Trade,
        );
        write_archive(&tick_path, &member_name(date), ["0,100,10,Buy"]).unwrap();

        let client = unroutable_client();
        let outcome = run_pipeline(
            &client,
            &config,
            date,
            EventType::Trade,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(tick_path.exists());
    }

    #[tokio::test]
    async fn test_transport_error_leaves_no_archives() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();
        let date = test_date();

        let client = unroutable_client();
        let result = run_pipeline(
            &client,
            &config,
            date,
            EventType::Quote,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(FrazilError::Http(_))));

        for resolution in Resolution::all() {
            let path = archive_path(
                &config.output_root,
                *resolution,
                &config.instrument,
                date,
                EventType::Quote,
            );
            assert!(!path.exists(), "{} should not exist", path.display());
        }
    }

    #[tokio::test]
    async fn test_cancellation_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        ensure_layout(&config.output_root, &config.instrument).unwrap();
        let date = test_date();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = unroutable_client();
        let result = run_pipeline(&client, &config, date, EventType::Trade, &cancel).await;
        assert!(matches!(result, Err(FrazilError::Cancelled)));

        for resolution in Resolution::all() {
            let path = archive_path(
                &config.output_root,
                *resolution,
                &config.instrument,
                date,
                EventType::Trade,
            );
            assert!(!path.exists());
        }
    }
}
