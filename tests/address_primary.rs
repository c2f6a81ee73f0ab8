mod common;

use storefront_api::{
    domain::role::Role,
    dto::addresses::AddressRequest,
    error::AppError,
    middleware::auth::AuthUser,
    services::address_service,
    state::AppState,
};
use uuid::Uuid;

use common::{create_user, setup_state};

fn address(label: &str) -> AddressRequest {
    AddressRequest {
        name: label.into(),
        phone: "081234567890".into(),
        email: "budi@example.com".into(),
        address: format!("Jl. {label} No. 1"),
        city: "Bandung".into(),
        postal_code: "40111".into(),
        province: "Jawa Barat".into(),
    }
}

async fn primary_ids(state: &AppState, user: &AuthUser) -> anyhow::Result<Vec<Uuid>> {
    let list = address_service::get_addresses(state, user)
        .await?
        .data
        .expect("addresses");
    Ok(list
        .items
        .iter()
        .filter(|a| a.is_primary)
        .map(|a| a.id)
        .collect())
}

#[tokio::test]
async fn exactly_one_primary_address() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, "user@example.com", Role::User).await?;
    let stranger = create_user(&state, "other@example.com", Role::User).await?;

    let home = address_service::create_address(&state, &user, address("Home"))
        .await?
        .data
        .expect("address");
    assert!(home.is_primary, "first address becomes primary");

    let office = address_service::create_address(&state, &user, address("Office"))
        .await?
        .data
        .expect("address");
    let shop = address_service::create_address(&state, &user, address("Shop"))
        .await?
        .data
        .expect("address");
    assert!(!office.is_primary);
    assert_eq!(primary_ids(&state, &user).await?, vec![home.id]);

    address_service::set_primary_address(&state, &user, office.id).await?;
    assert_eq!(primary_ids(&state, &user).await?, vec![office.id]);

    let primary = address_service::get_primary_address(&state, &user)
        .await?
        .data
        .flatten()
        .expect("primary address");
    assert_eq!(primary.id, office.id);

    // Racing requests serialize on the row lock.
    let (a, b) = tokio::join!(
        address_service::set_primary_address(&state, &user, home.id),
        address_service::set_primary_address(&state, &user, shop.id),
    );
    a?;
    b?;
    let primaries = primary_ids(&state, &user).await?;
    assert_eq!(primaries.len(), 1);
    assert!(primaries[0] == home.id || primaries[0] == shop.id);

    let foreign = address_service::set_primary_address(&state, &stranger, home.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    let none = address_service::get_primary_address(&state, &stranger)
        .await?
        .data
        .flatten();
    assert!(none.is_none());

    // Simultaneous first creates must still yield a single primary.
    let fresh = create_user(&state, "fresh@example.com", Role::User).await?;
    let (a, b, c, d) = tokio::join!(
        address_service::create_address(&state, &fresh, address("North")),
        address_service::create_address(&state, &fresh, address("South")),
        address_service::create_address(&state, &fresh, address("East")),
        address_service::create_address(&state, &fresh, address("West")),
    );
    for created in [a, b, c, d] {
        created?;
    }
    let list = address_service::get_addresses(&state, &fresh)
        .await?
        .data
        .expect("addresses");
    assert_eq!(list.items.len(), 4);
    assert_eq!(primary_ids(&state, &fresh).await?.len(), 1);

    Ok(())
}
