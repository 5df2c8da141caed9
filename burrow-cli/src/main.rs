use anyhow::Result;
use burrow_core::{
    paths, ArtifactBuilder, NetworkAttacher, PortAllocator, Profile, ProfileConfig, Provisioner,
    StackController, StatusStore, TemplateStore, Tenant,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "burrow")]
#[command(about = "Tenant stack provisioning CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new tenant record (no infrastructure yet)
    Create {
        /// Human-readable tenant name
        #[arg(short, long)]
        name: String,

        /// Owner account identifier
        #[arg(short, long)]
        owner: String,

        /// Admin username seeded into the tenant's application
        #[arg(long, default_value = "admin")]
        admin_username: String,

        /// Bcrypt hash of the admin password
        #[arg(long)]
        admin_password_hash: String,
    },

    /// Provision a pending tenant's stack
    Provision {
        /// Tenant ID
        tenant: String,

        /// Email address seeded for the admin principal
        #[arg(long)]
        owner_email: String,
    },

    /// Stop a tenant's stack and soft-delete the record
    Stop {
        /// Tenant ID
        tenant: String,
    },

    /// Restore a soft-deleted tenant
    Restore {
        /// Tenant ID
        tenant: String,
    },

    /// Permanently remove a soft-deleted tenant and all its data
    Teardown {
        /// Tenant ID
        tenant: String,
    },

    /// List all tenants
    Ls,
}

fn print_tenant(tenant: &Tenant) {
    println!("{:<14} {:<24} {:<14} {}", tenant.id, tenant.display_name, tenant.owner_id, tenant.status);
}

async fn build_provisioner() -> Result<Provisioner> {
    let config = Arc::new(ProfileConfig::resolve(Profile::from_env()));
    let store = Arc::new(StatusStore::new(paths::db_path()).await?);
    let runtime = Arc::new(burrow_core::DockerCli::new());
    let clock = Arc::new(burrow_core::TokioClock);

    Ok(Provisioner::new(
        store.clone(),
        StackController::new(runtime.clone(), clock),
        NetworkAttacher::new(runtime, &config),
        ArtifactBuilder::new(TemplateStore::embedded(), &config),
        PortAllocator::new(store),
        config,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    burrow_core::init_observability()?;

    let cli = Cli::parse();
    let provisioner = build_provisioner().await?;

    match cli.command {
        Commands::Create { name, owner, admin_username, admin_password_hash } => {
            let tenant = provisioner
                .create(burrow_core::CreateRequest {
                    display_name: name,
                    owner_id: owner,
                    admin_username,
                    admin_password_hash,
                })
                .await?;
            println!("{}", tenant.id);
        }

        Commands::Provision { tenant, owner_email } => {
            let tenant = provisioner.provision(&tenant, &owner_email).await?;
            println!("Tenant {} is active", tenant.id);
            if let (Some(host), Some(user)) = (&tenant.datastore_host, &tenant.datastore_user) {
                println!("  datastore: {} (user {})", host, user);
            }
            if let Some(cache) = &tenant.cache_host {
                println!("  cache:     {}", cache);
            }
        }

        Commands::Stop { tenant } => {
            let tenant = provisioner.stop(&tenant).await?;
            println!("Tenant {} stopped", tenant.id);
        }

        Commands::Restore { tenant } => {
            let tenant = provisioner.restore(&tenant).await?;
            println!("Tenant {} restored to {}", tenant.id, tenant.status);
        }

        Commands::Teardown { tenant } => {
            provisioner.teardown(&tenant).await?;
            println!("Tenant {} removed", tenant);
        }

        Commands::Ls => {
            let tenants = provisioner.list().await?;
            println!("{:<14} {:<24} {:<14} {}", "ID", "NAME", "OWNER", "STATUS");
            for tenant in &tenants {
                print_tenant(tenant);
            }
        }
    }

    Ok(())
}
