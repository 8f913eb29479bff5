use anyhow::{Result, bail};
use leveropen::{Lever, Tabular};

fn main() -> Result<()> {
    env_logger::init();

    // Configure the token via LEVEROPEN_ACCESS_TOKEN or a `.leveropenrc` file.
    let lever = Lever::from_env()?.with_progress(true);

    let mut datasets = lever.get_datasets_by_collection("Gross Domestic Product (GDP)")?;
    let Some(dataset) = datasets.first_mut() else {
        bail!("no dataset in collection \"Gross Domestic Product (GDP)\"");
    };

    println!("Collection: {}\nTopic: {}", dataset.collection, dataset.topic);
    for (name, data) in dataset.collect_series_data()? {
        println!("\n{} ({} observations)", name, data.len());
        for (period, obs) in data.iter() {
            println!("  {:<12} {}", period, obs.value);
        }
    }
    Ok(())
}
