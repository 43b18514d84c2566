//! Basic example demonstrating the Scratch API client.
//!
//! Run with:
//! ```
//! cargo run --example basic
//! ```
//!
//! Set `SCRATCH_USERNAME`, `SCRATCH_SESSION_ID` and `SCRATCH_CSRF_TOKEN` to
//! also love the first explored project.

use scratchapi::{
    explore_projects, get_project, ExploreMode, ExploreQuery, Listing, ProjectLookup,
    ScratchClient,
};

#[tokio::main]
async fn main() -> scratchapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating Scratch client...");
    let client = ScratchClient::from_env()?;
    println!("Connected to: {}", client.api_base());

    // Explore the most popular projects
    println!("\n--- Exploring Projects ---");
    let query = ExploreQuery::default().mode(ExploreMode::Popular);
    let projects = explore_projects(&client, query, Listing::first(10)).await?;
    println!("Found {} projects", projects.len());

    for project in &projects {
        println!("  - {} by {} ({} loves)", project, project.author, project.loves);
    }

    let Some(first) = projects.first() else {
        println!("\nDone!");
        return Ok(());
    };

    // Look the first one up again and show its details
    println!("\n--- Project Details ---");
    match get_project(&client, first.id).await? {
        ProjectLookup::Found(mut project) => {
            println!("Project: {}", project.title);
            println!("  URL: {}", project.url);
            println!("  Views: {}", project.views);
            println!("  Remix of: {:?}", project.remix_parent);

            println!("\n--- Latest Comments ---");
            for comment in project.comments(Listing::first(5)).await? {
                println!(
                    "  {}: {}",
                    comment.author_name().unwrap_or("unknown"),
                    comment.content
                );
            }

            match project.creator_agent().await {
                Ok(agent) => println!("\nLast saved with: {agent}"),
                Err(e) => println!("\nNo payload available: {e}"),
            }

            if client.session().is_some() {
                println!("\n--- Loving Project ---");
                project.love().await?;
                println!("Loved {}", project.title);
            }
        }
        ProjectLookup::Partial(partial) => {
            println!("Project {} is not shared", partial.id);
        }
    }

    println!("\nDone!");
    Ok(())
}
