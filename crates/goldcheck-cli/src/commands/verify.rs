use goldcheck_core::{ContractsLayout, RunReport, verify_contracts};
use std::path::PathBuf;

pub fn run(contracts_dir: Option<PathBuf>, json_output: bool) {
    let layout = contracts_dir
        .map(ContractsLayout::new)
        .unwrap_or_else(detect_layout);
    tracing::debug!(root = %layout.root.display(), "using contracts directory");

    let report = verify_contracts(&layout).unwrap_or_else(|err| {
        eprintln!("error: verify-contracts failed: {err}");
        std::process::exit(2);
    });

    if json_output {
        let payload = report.to_json(&layout.root.display().to_string());
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render verify-contracts payload: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
    } else {
        print_report(&report);
    }

    std::process::exit(report.exit_code());
}

fn detect_layout() -> ContractsLayout {
    let cwd = std::env::current_dir().unwrap_or_else(|err| {
        eprintln!("error: failed to resolve current directory: {err}");
        std::process::exit(2);
    });
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from));
    ContractsLayout::detect(&cwd, exe_dir.as_deref())
}

fn print_report(report: &RunReport) {
    print!("{}", report.render());
}
