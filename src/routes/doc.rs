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
    dto::{
        appointments::{AppointmentList, BookAppointmentRequest, UpdateAppointmentStatusRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        categories::{CategoryList, CategoryRequest},
        orders::{
            ChangeStatusRequest, OrderDetails, OrderLineRequest, OrderList, OrderStatusList,
            PlaceOrderRequest,
        },
        products::{ProductList, ProductRequest},
    },
    error::FieldError,
    models::{
        Appointment, AppointmentStatus, Category, Order, OrderItem, OrderStatus, Product, Role,
        StatusHistoryEntry, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, appointments, auth, catalog, health, orders, params},
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
        auth::me,
        catalog::list_products,
        catalog::get_product,
        catalog::list_categories,
        catalog::get_category,
        catalog::list_order_statuses,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        appointments::list_appointments,
        appointments::book_appointment,
        appointments::cancel_appointment,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_products,
        admin::get_product,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::upload_product_image,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::change_order_status,
        admin::delete_order,
        admin::list_all_appointments,
        admin::set_appointment_status
    ),
    components(
        schemas(
            Role,
            User,
            Category,
            Product,
            Order,
            OrderItem,
            OrderStatus,
            StatusHistoryEntry,
            Appointment,
            AppointmentStatus,
            FieldError,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CategoryRequest,
            CategoryList,
            ProductRequest,
            ProductList,
            PlaceOrderRequest,
            OrderLineRequest,
            ChangeStatusRequest,
            OrderDetails,
            OrderList,
            OrderStatusList,
            BookAppointmentRequest,
            UpdateAppointmentStatusRequest,
            AppointmentList,
            admin::ImageUploadForm,
            health::HealthData,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<OrderDetails>,
            ApiResponse<OrderList>,
            ApiResponse<OrderStatusList>,
            ApiResponse<Appointment>,
            ApiResponse<AppointmentList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Catalog", description = "Public products, categories and order statuses"),
        (name = "Orders", description = "Client orders"),
        (name = "Appointments", description = "Client service appointments"),
        (name = "Admin", description = "Designer back office"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
