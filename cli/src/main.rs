use aprswave_core::{build_frame, AudioParams, Encoder, PositionFormat, PositionReport, DEFAULT_DESTINATION};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aprswave")]
#[command(about = "Encode an APRS position report as an AFSK1200 WAV file")]
struct Cli {
    /// Callsign to send from
    #[arg(long, default_value = "W1AW")]
    call: String,

    /// Station SSID (0-15)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..16))]
    ssid: u8,

    /// Destination callsign
    #[arg(long, default_value = DEFAULT_DESTINATION)]
    dest: String,

    /// Digipeater path code carried in the destination SSID
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..16))]
    digi: u8,

    /// Latitude in signed degrees
    #[arg(long, default_value_t = 41.7147, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in signed degrees
    #[arg(long, default_value_t = -72.7272, allow_negative_numbers = true)]
    long: f64,

    /// Altitude in feet
    #[arg(long, allow_negative_numbers = true)]
    alt: Option<f64>,

    /// Course in degrees (used together with --speed)
    #[arg(long)]
    course: Option<u16>,

    /// Speed in knots (used together with --course)
    #[arg(long)]
    speed: Option<f64>,

    /// Comment to append to the position report
    #[arg(long, default_value = "Test")]
    comment: String,

    /// Position format
    #[arg(long, value_enum, default_value_t = Format::B)]
    format: Format,

    /// Sample rate in samples per second
    #[arg(long, default_value_t = 48_000)]
    sr: u32,

    /// Bits per sample: 8, 16, 24 or 32
    #[arg(long, default_value_t = 16)]
    br: u16,

    /// Number of audio channels
    #[arg(long, default_value_t = 1)]
    nc: u16,

    /// Output level as a fraction of full scale
    #[arg(long, default_value_t = 0.75)]
    volume: f64,

    /// Output WAV file (derived from the report when omitted)
    #[arg(value_name = "OUTPUT.WAV")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Basic plain-text position
    B,
    /// Base-91 compressed position
    C,
}

impl From<Format> for PositionFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::B => PositionFormat::Basic,
            Format::C => PositionFormat::Compressed,
        }
    }
}

impl Cli {
    fn report(&self) -> PositionReport {
        let mut report = PositionReport::new(self.call.clone(), self.lat, self.long)
            .with_ssid(self.ssid)
            .with_destination(self.dest.clone())
            .with_destination_ssid(self.digi)
            .with_comment(self.comment.clone())
            .with_format(self.format.into());
        if let Some(alt) = self.alt {
            report = report.with_altitude(alt);
        }
        if let Some(course) = self.course {
            report = report.with_course(course);
        }
        if let Some(speed) = self.speed {
            report = report.with_speed(speed);
        }
        report
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}_{:.2}_{:.2}_{}Hz_{}bits_{}chan_{}.wav",
                self.call, self.lat, self.long, self.sr, self.br, self.nc, self.comment
            ))
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let params = AudioParams::new(cli.sr, cli.br, cli.nc)?.with_volume(cli.volume);
    let report = cli.report();
    let output = cli.output_path();

    let frame = build_frame(&report)?;
    log::info!("APRS: {}", frame.to_tnc2());

    let encoder = Encoder::new(params);
    let written = encoder.write_frame(&frame, &output)?;
    log::info!(
        "Wrote {} bytes ({} Hz, {} bits, {} channels) to {}",
        written,
        params.sample_rate(),
        params.bits_per_sample(),
        params.channels(),
        output.display()
    );

    Ok(())
}
