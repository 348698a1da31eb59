use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use vertexa::{open_graph, open_graph_with, Cardinality, GraphConfig, GraphHandle, Label, PropertyMap, Traverser};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional YAML config as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => GraphConfig::from_file(&path).with_context(|| format!("loading config from {}", path))?,
        None => GraphConfig::default(),
    };

    println!("Vertexa Graph Engine v{}", vertexa::version());
    println!("==========================================");

    demo_create_and_search()?;
    demo_vertex_and_edge()?;
    demo_direct_graph_api()?;

    let snapshot = std::env::temp_dir().join("vertexa-demo.snapshot");
    demo_write_snapshot(&config, &snapshot)?;
    demo_read_snapshot(&config, &snapshot)?;

    demo_create_if_not_exists()?;
    demo_list_property()?;

    println!("\n✅ All demos completed");
    Ok(())
}

fn print_all(results: Vec<Traverser>) {
    for result in results {
        println!("  → {}", result);
    }
}

/// addV with properties, then search by property
fn demo_create_and_search() -> Result<()> {
    println!("\n=== Demo 1: Create and search ===");
    let graph = open_graph();
    let g = graph.traversal();

    g.add_v("person").property("name", "marko").property("age", 30).next()?;

    print_all(g.v().has("name", "marko").values("age").to_list()?);
    Ok(())
}

/// Two vertices joined by an edge, then navigate along it
fn demo_vertex_and_edge() -> Result<()> {
    println!("\n=== Demo 2: Vertices and edges ===");
    let graph = open_graph();
    let g = graph.traversal();

    let person = g.add_v("person").property("name", "marko").property("age", 30).next()?.into_vertex()?;
    let job = g
        .add_v("job")
        .property("name", "Software Engineer")
        .property("company", "abcdefgh")
        .next()?
        .into_vertex()?;

    g.add_e("works").from(&person).to(&job).iterate()?;

    print_all(g.v().has("name", "marko").out(&["works"]).values("name").to_list()?);
    Ok(())
}

/// Build the graph through the handle, query it through a traversal
fn demo_direct_graph_api() -> Result<()> {
    println!("\n=== Demo 3: Direct graph API ===");
    let graph = marko_works_graph(GraphConfig::default())?;

    print_all(
        graph
            .traversal()
            .v()
            .has("name", "marko")
            .out(&["works"])
            .values("Job Position")
            .to_list()?,
    );
    Ok(())
}

fn marko_works_graph(config: GraphConfig) -> Result<GraphHandle> {
    let graph = open_graph_with(config);
    let person = graph.add_vertex(Label::DEFAULT_VERTEX, PropertyMap::new().with("name", "marko"));
    let job = graph.add_vertex(
        Label::DEFAULT_VERTEX,
        PropertyMap::new().with("Job Position", "Software Engineer"),
    );
    graph.add_edge("works", &person, &job, PropertyMap::new())?;
    Ok(graph)
}

fn demo_write_snapshot(config: &GraphConfig, path: &Path) -> Result<()> {
    println!("\n=== Demo 4: Write snapshot ===");
    let graph = marko_works_graph(config.clone())?;
    graph
        .write_snapshot(path)
        .with_context(|| format!("writing snapshot to {}", path.display()))?;
    println!("  → wrote {}", path.display());
    Ok(())
}

fn demo_read_snapshot(config: &GraphConfig, path: &Path) -> Result<()> {
    println!("\n=== Demo 5: Read snapshot ===");
    let graph = open_graph_with(config.clone());
    graph
        .read_snapshot(path)
        .with_context(|| format!("reading snapshot from {}", path.display()))?;

    print_all(
        graph
            .traversal()
            .v()
            .has("name", "marko")
            .out(&["works"])
            .values("Job Position")
            .to_list()?,
    );
    Ok(())
}

/// Uniqueness is checked by the application before inserting
fn demo_create_if_not_exists() -> Result<()> {
    println!("\n=== Demo 6: Create if not exists ===");
    let graph = open_graph();
    let g = graph.traversal();

    g.add_v("person").property("name", "marko").property("age", 30).next()?;

    let exists = !g.v().has("name", "marko").has("age", 30).to_set()?.is_empty();
    if !exists {
        g.add_v("person").property("name", "marko").property("age", 30).next()?;
    }

    print_all(g.v().has("name", "marko").values("age").to_list()?);
    Ok(())
}

/// List cardinality keeps every value in write order
fn demo_list_property() -> Result<()> {
    println!("\n=== Demo 7: List properties ===");
    let graph = open_graph();
    let g = graph.traversal();

    let marko = g.add_v("person").property("name", "marko").property("age", 30).next()?.into_vertex()?;
    for hobby in ["Reading books", "Playing Video Games"] {
        graph.set_vertex_property(&marko, "hobbies", hobby, Cardinality::List)?;
    }

    for vertex in g.v().has("name", "marko").to_stream() {
        let vertex = vertex?.into_vertex()?;
        for hobby in vertex.values("hobbies") {
            println!("  → {}", hobby);
        }
    }
    Ok(())
}
