use crate::config::Config;
use crate::links::{LinkValidator, Rejection, Validation, extract_links, identifier_of};
use anyhow::{Context, Result};

pub async fn check_link(config: &Config, url: &str) -> Result<()> {
    let validator =
        LinkValidator::from_config(&config.validator).context("build link validator")?;
    let outcome = validator.check(url).await;
    println!("{}", describe(url, &outcome));
    Ok(())
}

pub fn print_extracted(text: &str) {
    let links = extract_links(text);
    if links.is_empty() {
        println!("No store links found.");
        return;
    }
    for link in links {
        match identifier_of(&link) {
            Some(id) => println!("{link}  (app {id})"),
            None => println!("{link}"),
        }
    }
}

pub fn describe(url: &str, outcome: &Validation) -> String {
    match outcome {
        Validation::Valid(id) => format!("valid: {url} (app {id})"),
        Validation::Unconfirmed { identifier, error } => {
            format!("accepted without confirmation: {url} (app {identifier}): {error}")
        }
        Validation::Invalid(rejection) => {
            let reason = match rejection {
                Rejection::Shape => "not a store app link".to_string(),
                Rejection::MissingIdentifier => "no app id in link".to_string(),
                Rejection::Status(status) => format!("catalog answered HTTP {status}"),
                Rejection::NotListed => "app not listed in the catalog".to_string(),
            };
            format!("invalid: {url}: {reason}")
        }
    }
}
