//! Command-line interface for xmlschema-datatypes

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use xmlschema_datatypes::{
    builtin_type_names, get_builtin_type, DeclaredFacets, DerivationMethod, FacetMask,
    SimpleTypeDecl, ValidationState,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdtype")]
#[command(author, version, about = "XML Schema simple type inspection and validation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in simple types
    Types {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the facets and properties of a type
    Describe {
        /// Built-in type name, used as base when facets are given
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Restrict the type with a facet, as name=value (repeatable)
        #[arg(short, long = "facet", value_name = "NAME=VALUE", value_parser = parse_facet)]
        facets: Vec<(String, String)>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a value against a type
    Validate {
        /// Built-in type name, used as base when facets are given
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Lexical value to validate
        #[arg(value_name = "VALUE")]
        value: String,

        /// Restrict the type with a facet, as name=value (repeatable)
        #[arg(short, long = "facet", value_name = "NAME=VALUE", value_parser = parse_facet)]
        facets: Vec<(String, String)>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Types { json } => cmd_types(json),
        Commands::Describe {
            type_name,
            facets,
            json,
        } => cmd_describe(&type_name, &facets, json),
        Commands::Validate {
            type_name,
            value,
            facets,
            json,
        } => cmd_validate(&type_name, &value, &facets, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn parse_facet(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", arg)),
    }
}

/// Look up a built-in type and restrict it with the given facets
#[cfg(feature = "cli")]
fn resolve_type(
    type_name: &str,
    facets: &[(String, String)],
) -> Result<Arc<SimpleTypeDecl>, Box<dyn std::error::Error>> {
    let base = get_builtin_type(type_name)
        .ok_or_else(|| format!("Unknown built-in type: {}", type_name))?;
    if facets.is_empty() {
        return Ok(base);
    }

    let mut declared = DeclaredFacets::new();
    for (name, value) in facets {
        declared = declared.with_facet(name, value)?;
    }
    let mut decl =
        SimpleTypeDecl::restriction(base, None, None, DerivationMethod::empty(), Vec::new());
    let mut ctx = ValidationState::new();
    decl.apply_facets(&declared, declared.present(), FacetMask::empty(), &mut ctx)?;
    Ok(Arc::new(decl))
}

#[cfg(feature = "cli")]
fn cmd_types(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json_output {
        let names: Vec<&str> = builtin_type_names().collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    println!("xmlschema-datatypes v{}", xmlschema_datatypes::VERSION);
    println!();
    println!("=== Built-in Types ===");
    for name in builtin_type_names() {
        if let Some(decl) = get_builtin_type(name) {
            println!("  {} ({:?}, base {})", name, decl.variety(), decl.base_type().type_name());
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_describe(
    type_name: &str,
    facets: &[(String, String)],
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use serde_json::json;

    let decl = resolve_type(type_name, facets)?;

    if json_output {
        let description = json!({
            "name": decl.type_name(),
            "namespace": decl.namespace(),
            "variety": decl.variety(),
            "base": decl.base_type().type_name(),
            "primitive": decl.primitive_type().map(|p| p.type_name().to_string()),
            "builtinKind": decl.builtin_kind(),
            "fundamentalFacets": decl.fundamental_facets(),
            "facets": decl.facets(),
            "multiValueFacets": decl.multi_value_facets(),
        });
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!("Type: {}", decl.expanded_name());
    println!("  Variety: {:?}", decl.variety());
    println!("  Base: {}", decl.base_type().type_name());
    if let Some(primitive) = decl.primitive_type() {
        println!("  Primitive: {}", primitive.type_name());
    }
    if let Some(item) = decl.item_type() {
        println!("  Item type: {}", item.type_name());
    }
    let fundamental = decl.fundamental_facets();
    println!(
        "  Ordered: {:?}, bounded: {}, finite: {}, numeric: {}",
        fundamental.ordered, fundamental.bounded, fundamental.finite, fundamental.numeric
    );

    let single = decl.facets();
    let multi = decl.multi_value_facets();
    if !single.is_empty() || !multi.is_empty() {
        println!();
        println!("Facets:");
        for facet in single {
            let fixed = if facet.fixed { " (fixed)" } else { "" };
            println!("  {} = {}{}", facet.kind.name(), facet.lexical_value, fixed);
        }
        for facet in multi {
            println!("  {} = [{}]", facet.kind.name(), facet.lexical_values.join(", "));
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_validate(
    type_name: &str,
    value: &str,
    facets: &[(String, String)],
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use serde_json::json;

    let decl = resolve_type(type_name, facets)?;
    let mut ctx = ValidationState::new();
    let result = decl.validate_with_info(value, &mut ctx);

    if json_output {
        let report = match &result {
            Ok(info) => json!({
                "valid": true,
                "normalized": info.normalized_value,
                "actualValue": info.actual_value.to_string(),
                "builtinKind": info.actual_value_type,
                "memberType": info.member_type.as_ref().map(|m| m.type_name().to_string()),
            }),
            Err(err) => json!({
                "valid": false,
                "key": err.key(),
                "args": err.args(),
                "message": err.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &result {
            Ok(info) => {
                println!("✓ Value is valid");
                println!("  Normalized: {}", info.normalized_value);
                println!("  Actual value: {}", info.actual_value);
                if let Some(member) = &info.member_type {
                    println!("  Member type: {}", member.type_name());
                }
            }
            Err(err) => {
                println!("✗ Value is invalid");
                println!();
                println!("Errors:");
                println!("  - {}", err);
            }
        }
    }

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
