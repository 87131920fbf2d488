use anyhow::Result;

use super::utils;

pub async fn run(user_id: &str) -> Result<()> {
    let api = utils::api_client().await?;
    let entitlements = api.get_user_entitlements(user_id).await?;

    fn mark(available: bool) -> &'static str {
        if available { "✅" } else { "❌" }
    }

    println!("Entitlements for {}:", entitlements.user_id);
    println!("  uploads:   {}", mark(entitlements.has_available_uploads));
    println!("  analyses:  {}", mark(entitlements.has_available_analyses));
    println!("  questions: {}", mark(entitlements.has_available_questions));
    Ok(())
}
