use log::info;
use warehouse_siting::config::{Options, OutputFormat, USAGE};
use warehouse_siting::sites::load_sites;
use warehouse_siting::{Problem, Scenario};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let options = Options::from_args(&args)?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let sites = load_sites(&options.source)?;
    let scenario = match &options.scenario {
        Some(path) => {
            info!("Loading scenario from {}", path.display());
            Scenario::from_yaml_path(path)?
        }
        None => Scenario::regional_warehouses(),
    };

    let plan = Problem { sites, scenario }.solve()?;

    match options.format {
        OutputFormat::Text => println!("{plan}"),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&plan)?),
    }
    Ok(())
}
