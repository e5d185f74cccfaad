// Interactive host for the engine.
//
// - Option [1] loads the county table named in the config.
// - Options [2]–[5] aggregate, report and analyze the loaded table.
// The binary owns all state; the library only computes.
use flare_engine::config::AppConfig;
use flare_engine::output;
use flare_engine::util;
use flare_engine::{Dataset, FilterState, GroupKey, MetricMode};
use once_cell::sync::Lazy;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// Loaded once per option [1]; reports and views reuse it until the next load.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        loads: 0,
    })
});

struct AppState {
    data: Option<Arc<Dataset>>,
    loads: u64,
}

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn optional(label: &str) -> Option<String> {
    let v = prompt(label);
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

fn current_dataset() -> Option<Arc<Dataset>> {
    let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data.clone()
}

fn handle_load(config: &AppConfig) {
    let path = &config.data.path;
    match flare_engine::loader::load_records(path) {
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} loaded)",
                util::format_int(report.total_rows as u64),
                util::format_int(report.loaded_rows as u64)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(report.parse_errors as u64)
                );
            }
            if report.invariant_warnings > 0 {
                println!(
                    "Warning: {} rows have counts that do not add up.",
                    util::format_int(report.invariant_warnings as u64)
                );
            }
            let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
            state.loads += 1;
            let dataset = Dataset::new(records, state.loads);
            let h = dataset.hierarchy();
            println!(
                "{} divisions, {} regions, {} chapters.\n",
                h.divisions.len(),
                h.region_to_division.len(),
                h.chapter_to_region.len()
            );
            state.data = Some(Arc::new(dataset));
        }
        Err(e) => eprintln!("Failed to load {}: {}\n", path.display(), e),
    }
}

fn read_filter(dataset: &Dataset) -> FilterState {
    let h = dataset.hierarchy();
    println!("Divisions: {}", h.divisions.join(", "));
    let mut filter = FilterState::default();
    filter = filter.apply_change(FilterState { division: optional("Division (blank for all)"), ..filter.clone() });
    let regions = h.region_options(&filter);
    if !regions.is_empty() {
        println!("Regions: {}", regions.join(", "));
    }
    filter = filter.apply_change(FilterState { region: optional("Region (blank for all)"), ..filter.clone() });
    println!("States: {}", flare_engine::hierarchy::state_options(dataset.records()).join(", "));
    filter.state = optional("State (blank for all)");
    filter
}

fn handle_aggregate(dataset: &Dataset) {
    let filter = read_filter(dataset);
    let key = match prompt("Group by [division/region/chapter/state/county]").parse::<GroupKey>() {
        Ok(k) => k,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };
    let mode = prompt("Metric mode [raw/perCapita/perHousehold]")
        .parse::<MetricMode>()
        .unwrap_or_default();

    let mut rows = dataset.aggregate_view(&filter, key);
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    let national = dataset.filtered_national(&filter);
    println!(
        "\n{} rows ({} fires, care {:.1}%, gap {:.1}%) | column: {}\n",
        rows.len(),
        util::format_int(national.total),
        national.care_rate,
        national.gap_rate,
        output::fires_header(mode)
    );
    output::preview_rows(&output::aggregated_preview(&rows, mode), 15);
}

fn handle_report(dataset: &Dataset, config: &AppConfig, county: bool) -> Result<(), Box<dyn Error>> {
    let id = if county {
        prompt("County FIPS")
    } else {
        prompt("Chapter name")
    };
    let report = if county {
        dataset.county_report(&id, &config.report)?
    } else {
        dataset.chapter_report(&id, &config.report)?
    };
    let report = report.stamped(chrono::Local::now().date_naive());

    println!("\n{} ({})\n", report.entity_name, report.entity_level);
    println!("{}\n", report.summary);
    println!("{}\n", report.equity_narrative);
    let months: Vec<String> = report
        .monthly
        .iter()
        .map(|m| format!("{} {}", util::format_month(&m.month), util::format_int(m.total)))
        .collect();
    if !months.is_empty() {
        println!("Monthly: {}\n", months.join(" | "));
    }
    if !report.peers.is_empty() {
        let names: Vec<&str> = report.peers.iter().map(|p| p.name.as_str()).collect();
        println!("Peers: {}\n", names.join(", "));
    }
    let file = PathBuf::from(format!("report_{}.json", id.replace(|c: char| !c.is_ascii_alphanumeric(), "_")));
    output::write_json(&file, &report)?;
    println!("(Full report exported to {})\n", file.display());
    Ok(())
}

fn handle_svi(dataset: &Dataset) {
    let filter = read_filter(dataset);
    let (buckets, equity) = dataset.svi_breakdown(&filter);
    println!("\nSVI Quintiles\n");
    output::preview_rows(&output::svi_preview(&buckets), 5);
    println!("{} (ratio {})\n", equity.narrative, equity.ratio);
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load(None)?;
    flare_engine::logging::init_logging(&config.logging);

    loop {
        println!("Select Operation:");
        println!("[1] Load the county table");
        println!("[2] Aggregate by level");
        println!("[3] Chapter report");
        println!("[4] County report");
        println!("[5] SVI equity breakdown");
        println!("[0] Exit\n");
        let choice = prompt("Enter choice");
        if choice == "0" {
            println!("Exiting the program.");
            return Ok(());
        }
        if choice == "1" {
            handle_load(&config);
            continue;
        }
        let Some(dataset) = current_dataset() else {
            println!("Error: No data loaded. Please load the county table first (option 1).\n");
            continue;
        };
        match choice.as_str() {
            "2" => handle_aggregate(&dataset),
            "3" | "4" => {
                if let Err(e) = handle_report(&dataset, &config, choice == "4") {
                    eprintln!("Report error: {}\n", e);
                }
            }
            "5" => handle_svi(&dataset),
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}
