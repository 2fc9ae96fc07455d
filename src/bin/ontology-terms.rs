use std::path::PathBuf;

use clap::Parser;
use ontology_terms::{
    config::Settings,
    logger,
    ontology::{ClassRelations, ResolvedTerms},
    Result,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ontology-terms", version)]
#[command(about = "Resolve labels, synonyms and definitions for ontology class URIs")]
struct Cli {
    /// YAML settings file (logger, fetch limits, registry prefixes)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Ontology document to load; wins over --ols-prefix
    #[arg(long = "ontology-uri", value_name = "URI")]
    ontology_uri: Option<String>,

    /// Properties file mapping ontology properties to term roles
    #[arg(long = "config-file", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Registry prefix naming the ontology to load
    #[arg(long = "ols-prefix", value_name = "PREFIX")]
    ols_prefix: Option<String>,

    /// Also print direct parents and children of each class
    #[arg(long)]
    relations: bool,

    /// Class URIs to resolve
    #[arg(required = true, value_name = "CLASS_URI")]
    classes: Vec<String>,
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    terms: &'a ResolvedTerms,
    #[serde(skip_serializing_if = "Option::is_none")]
    relations: Option<&'a ClassRelations>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    logger::init(&settings.logger);

    let mut options = settings.helper.clone();
    if let Some(uri) = cli.ontology_uri {
        options = options.with_ontology_uri(uri);
    }
    if let Some(path) = cli.config_file {
        options = options.with_configuration_file(path);
    }
    if let Some(prefix) = cli.ols_prefix {
        options = options.with_ols_prefix(prefix);
    }

    let resolver = settings.helper_factory(options)?.build_helper().await?;

    for class in &cli.classes {
        let terms = resolver.resolve_terms(class)?;
        let relations = if cli.relations {
            Some(resolver.relations(class)?)
        } else {
            None
        };
        let output = Output {
            terms: &terms,
            relations: relations.as_deref(),
        };
        println!("{}", serde_json::to_string(&output)?);
    }
    Ok(())
}
