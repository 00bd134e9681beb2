use flp_file::diagnostics::Severity;
use flp_file::project::names;
use flp_file::{diff, merge, Project};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("read") if args.len() == 2 => read(&args[1]),
        Some("diff") if args.len() == 4 || args.len() == 5 => merge_command(
            &args[1],
            &args[2],
            &args[3],
            args.get(4).map(String::as_str),
        ),
        _ => {
            eprintln!("Usage: flp_file read <project>");
            eprintln!("       flp_file diff <original> <version_a> <version_b> [merged_out]");
            process::exit(2);
        }
    };
    if let Err(message) = result {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn sink(severity: Severity, message: &str) {
    eprintln!("{}: {}", severity, message);
}

fn load(path: &str) -> Result<Project, String> {
    Project::load_with_sink(path, &mut sink).map_err(|e| format!("{}: {}", path, e))
}

fn read(path: &str) -> Result<(), String> {
    let project = load(path)?;
    let arrangement = match project.arrangements.first() {
        Some(arrangement) => arrangement,
        None => {
            println!("(no arrangements)");
            return Ok(());
        }
    };
    for item in &arrangement.items {
        println!(
            "{} at Track {}, {}",
            names::item_name(&project, item),
            item.track,
            names::ticks_to_bst(&project, item.start)
        );
    }
    Ok(())
}

fn merge_command(
    original_path: &str,
    a_path: &str,
    b_path: &str,
    out_path: Option<&str>,
) -> Result<(), String> {
    let original = load(original_path)?;
    let version_a = load(a_path)?;
    let version_b = load(b_path)?;

    let arrangement_o = first_arrangement(&original, original_path)?;
    let arrangement_a = first_arrangement(&version_a, a_path)?;
    let arrangement_b = first_arrangement(&version_b, b_path)?;

    let changes_a = diff::diff_arrangements(arrangement_o, arrangement_a);
    let changes_b = diff::diff_arrangements(arrangement_o, arrangement_b);

    println!("--- {} -> {}", original_path, a_path);
    for line in diff::describe(&original, arrangement_o, &changes_a) {
        println!("{}", line);
    }
    println!("{}", diff::summarize(&changes_a));

    println!("--- {} -> {}", original_path, b_path);
    for line in diff::describe(&original, arrangement_o, &changes_b) {
        println!("{}", line);
    }
    println!("{}", diff::summarize(&changes_b));

    let merged = merge::merge_arrangement(arrangement_o, &changes_a, &changes_b)
        .map_err(|e| e.to_string())?;
    println!("--- merged arrangement: {} items", merged.items.len());

    if let Some(out) = out_path {
        let mut merged_project = original.clone();
        merged_project.arrangements[0] = merged;
        merged_project.save(out).map_err(|e| e.to_string())?;
        println!("wrote {}", out);
    }
    Ok(())
}

fn first_arrangement<'p>(
    project: &'p Project,
    path: &str,
) -> Result<&'p flp_file::project::Arrangement, String> {
    project
        .arrangements
        .first()
        .ok_or_else(|| format!("{}: project has no arrangements", path))
}
