//! `pif show <user>` – print the stored profile image reference.

use anyhow::Result;
use pif_core::profile_store::{ProfileDb, UserId};

pub async fn run_show(db: &ProfileDb, user: &str) -> Result<()> {
    let user = UserId::from(user);
    match db.image_ref(&user).await? {
        Some(image_ref) => println!("{image_ref}"),
        None => println!("No profile image set for {user}"),
    }
    Ok(())
}
