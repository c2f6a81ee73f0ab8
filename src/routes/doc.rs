use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        payment::{Bank, PaymentMethod, PaymentStatus},
        role::Role,
        shipping::ShippingMethod,
        status::OrderStatus,
    },
    dto::{
        addresses::{AddressList, AddressRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{
            AddToCartRequest, CartCount, CartItemList, Success, UpdateCartItemRequest,
            UpdateCheckedRequest,
        },
        dashboard::{
            CustomerOrder, CustomerOrderList, CustomerSummary, MonthlyRevenue, TotalQuantity,
            TotalSales, TotalUsers,
        },
        orders::{
            CreateOrderRequest, OrderDetail, OrderLineInput, OrderList, UpdateOrderImageRequest,
            UpdateOrderStatusRequest,
        },
        payments::{ConfirmPaymentRequest, PaymentReference},
        products::{CreateProductRequest, ImageInput, ProductList, UpdateProductRequest},
        users::{UpdatePasswordRequest, UpdateProfileRequest},
    },
    models::{Address, Cart, CartItem, Order, OrderProduct, Payment, Product, ProductImage, User},
    response::{ApiResponse, Meta},
    routes::{
        addresses, auth, cart, dashboard, health, orders, params, payments, products, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::get_profile,
        users::update_profile,
        users::update_password,
        products::list_products,
        products::get_all_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        addresses::get_addresses,
        addresses::create_address,
        addresses::get_primary_address,
        addresses::get_address_by_id,
        addresses::update_address,
        addresses::delete_address,
        addresses::set_primary_address,
        cart::get_cart,
        cart::get_checked_items,
        cart::add_item,
        cart::get_cart_items_by_ids,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        cart::get_cart_count,
        cart::update_checked_item,
        cart::update_checked_all,
        orders::create_order,
        orders::get_orders,
        orders::get_my_orders,
        orders::get_order_receipt,
        orders::get_order_by_id,
        orders::update_order_status,
        orders::update_image_order,
        orders::delete_order,
        payments::confirm_payment,
        payments::get_payment_by_order,
        payments::get_payment_by_reference,
        dashboard::total_sales,
        dashboard::total_orders,
        dashboard::total_users,
        dashboard::recent_customers,
        dashboard::monthly_revenue
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            ProductImage,
            Address,
            Cart,
            CartItem,
            Order,
            OrderProduct,
            Payment,
            OrderStatus,
            PaymentMethod,
            PaymentStatus,
            Bank,
            ShippingMethod,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UpdatePasswordRequest,
            ImageInput,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddressRequest,
            AddressList,
            AddToCartRequest,
            UpdateCartItemRequest,
            UpdateCheckedRequest,
            CartItemList,
            CartCount,
            Success,
            OrderLineInput,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            UpdateOrderImageRequest,
            OrderDetail,
            OrderList,
            ConfirmPaymentRequest,
            PaymentReference,
            TotalSales,
            TotalQuantity,
            TotalUsers,
            CustomerSummary,
            CustomerOrder,
            CustomerOrderList,
            MonthlyRevenue,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<Payment>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Profile endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Addresses", description = "Shipping address book"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order workflow endpoints"),
        (name = "Payments", description = "Payment confirmation endpoints"),
        (name = "Dashboard", description = "Admin sales dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
