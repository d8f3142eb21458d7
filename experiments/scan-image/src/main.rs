use qrscan::{
    DecoderOptionsPatch, QrScanner, RqrrEngine, ScanImageOptions, ScanImageSource, ScanRegion,
};
use qrscan_base::log;
use std::path::PathBuf;

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <file|file://...|http://...> [--region x,y,w,h] [--options <json>] [--debug]",
        program
    );
    std::process::exit(1);
}

fn parse_region(text: &str) -> Option<ScanRegion> {
    let parts: Vec<u32> = text
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts[..] {
        [x, y, width, height] => Some(ScanRegion::new(x, y, width, height)),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    qrscan_base::init_stdout_logger();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
    }

    let input = &args[1];
    let mut options = ScanImageOptions::default();
    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--region" => {
                let Some(region) = rest.next().and_then(|r| parse_region(r)) else {
                    usage(&args[0]);
                };
                options = options.with_scan_region(region);
            }
            "--options" => {
                let Some(json) = rest.next() else {
                    usage(&args[0]);
                };
                options = options.with_decoder_options(DecoderOptionsPatch::from_json(json)?);
            }
            "--debug" => QrScanner::set_debug(true),
            _ => usage(&args[0]),
        }
    }

    let source = if input.contains("://") {
        ScanImageSource::Url(input.clone())
    } else {
        ScanImageSource::File(PathBuf::from(input))
    };

    let mut engine = RqrrEngine::new();
    match QrScanner::scan_image(&mut engine, source, &options).await {
        Ok(result) => {
            log::info!("corners: {:?}", result.corner_points);
            println!("{}", result.data);
            Ok(())
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    }
}
