//! Entry point for nc-climdex.
//! Handles CLI parsing, path selection and dispatches the indices pipeline.

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use nc_climdex::metadata::{indicator_list_json, print_indicator_list};
use nc_climdex::parallel::{get_parallel_info, ParallelConfig};
use nc_climdex::pipeline;
use nc_climdex::progress;
use nc_climdex::prompt::DialogPrompt;
use nc_climdex::IndicesConfig;
use std::process;

use cli::Args;

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = IndicesConfig::default()
        .with_pattern(args.pattern)
        .with_compression_level(args.compression);

    if args.list_indicators {
        if args.json {
            println!("{}", indicator_list_json(&config)?);
        } else {
            print_indicator_list(&config);
        }
        return Ok(());
    }

    // --json keeps stdout for the summary alone
    progress::redirect_to_stderr(args.json);

    progress::emit(format_args!(
        r#"
------------------------------------------------------------------
                 _ _           _
   _ __   ___ ___| (_)_ __ ___   __| | _____  __
  | '_ \ / __/ __| | | '_ ` _ \ / _` |/ _ \ \/ /
  | | | | (_| (__| | | | | | | | (_| |  __/>  <
  |_| |_|\___\___|_|_|_| |_| |_|\__,_|\___/_/\_\
             Annual climate indices from NetCDF
------------------------------------------------------------------
"#
    ));

    ParallelConfig::new(args.threads).setup_global_pool()?;
    if args.verbose > 0 {
        get_parallel_info().print_info();
    }

    let summary = pipeline::run(&DialogPrompt, args.input_dir, args.output, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        eprintln!("Done!!!");
    } else {
        summary.print();
        println!("Done!!!");
    }
    Ok(())
}
