use arrow::datatypes::{DataType, Field, Schema};
use common::{Error, Result};

use ColumnType::{BigInt, Date, Decimal, Int, Str};

/// Logical TPC-DS column types, before any physical substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    BigInt,
    Str,
    Date,
    Decimal(u8, i8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: true,
    }
}

const fn key(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: false,
    }
}

/// Physical type substitutions applied when materialising a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    pub use_double_for_decimal: bool,
    pub use_string_for_date: bool,
}

impl ColumnType {
    pub fn data_type(self, options: SchemaOptions) -> DataType {
        match self {
            ColumnType::Int => DataType::Int32,
            ColumnType::BigInt => DataType::Int64,
            ColumnType::Str => DataType::Utf8,
            ColumnType::Date if options.use_string_for_date => DataType::Utf8,
            ColumnType::Date => DataType::Date32,
            ColumnType::Decimal(..) if options.use_double_for_decimal => DataType::Float64,
            ColumnType::Decimal(precision, scale) => DataType::Decimal128(precision, scale),
        }
    }
}

/// Column definitions of a TPC-DS table in `dsdgen` output order.
pub fn columns(table: &str) -> Option<&'static [Column]> {
    let columns = match table {
        "call_center" => CALL_CENTER,
        "catalog_page" => CATALOG_PAGE,
        "catalog_returns" => CATALOG_RETURNS,
        "catalog_sales" => CATALOG_SALES,
        "customer" => CUSTOMER,
        "customer_address" => CUSTOMER_ADDRESS,
        "customer_demographics" => CUSTOMER_DEMOGRAPHICS,
        "date_dim" => DATE_DIM,
        "household_demographics" => HOUSEHOLD_DEMOGRAPHICS,
        "income_band" => INCOME_BAND,
        "inventory" => INVENTORY,
        "item" => ITEM,
        "promotion" => PROMOTION,
        "reason" => REASON,
        "ship_mode" => SHIP_MODE,
        "store" => STORE,
        "store_returns" => STORE_RETURNS,
        "store_sales" => STORE_SALES,
        "time_dim" => TIME_DIM,
        "warehouse" => WAREHOUSE,
        "web_page" => WEB_PAGE,
        "web_returns" => WEB_RETURNS,
        "web_sales" => WEB_SALES,
        "web_site" => WEB_SITE,
        _ => return None,
    };
    Some(columns)
}

pub fn table_schema(table: &str, options: SchemaOptions) -> Result<Schema> {
    let columns = columns(table)
        .ok_or_else(|| Error::InvalidInput(format!("Unknown TPC-DS table '{}'", table)))?;

    let fields: Vec<Field> = columns
        .iter()
        .map(|column| Field::new(column.name, column.ty.data_type(options), column.nullable))
        .collect();

    Ok(Schema::new(fields))
}

/// Schema of the files of a partitioned table: the partition column lives in the
/// directory names, not in the data.
pub fn file_schema(
    table: &str,
    options: SchemaOptions,
    partition_column: Option<&str>,
) -> Result<Schema> {
    let schema = table_schema(table, options)?;
    match partition_column {
        Some(partition) => {
            let fields: Vec<Field> = schema
                .fields()
                .iter()
                .filter(|field| field.name() != partition)
                .map(|field| field.as_ref().clone())
                .collect();
            Ok(Schema::new(fields))
        }
        None => Ok(schema),
    }
}

const CALL_CENTER: &[Column] = &[
    key("cc_call_center_sk", Int),
    key("cc_call_center_id", Str),
    col("cc_rec_start_date", Date),
    col("cc_rec_end_date", Date),
    col("cc_closed_date_sk", Int),
    col("cc_open_date_sk", Int),
    col("cc_name", Str),
    col("cc_class", Str),
    col("cc_employees", Int),
    col("cc_sq_ft", Int),
    col("cc_hours", Str),
    col("cc_manager", Str),
    col("cc_mkt_id", Int),
    col("cc_mkt_class", Str),
    col("cc_mkt_desc", Str),
    col("cc_market_manager", Str),
    col("cc_division", Int),
    col("cc_division_name", Str),
    col("cc_company", Int),
    col("cc_company_name", Str),
    col("cc_street_number", Str),
    col("cc_street_name", Str),
    col("cc_street_type", Str),
    col("cc_suite_number", Str),
    col("cc_city", Str),
    col("cc_county", Str),
    col("cc_state", Str),
    col("cc_zip", Str),
    col("cc_country", Str),
    col("cc_gmt_offset", Decimal(5, 2)),
    col("cc_tax_percentage", Decimal(5, 2)),
];

const CATALOG_PAGE: &[Column] = &[
    key("cp_catalog_page_sk", Int),
    key("cp_catalog_page_id", Str),
    col("cp_start_date_sk", Int),
    col("cp_end_date_sk", Int),
    col("cp_department", Str),
    col("cp_catalog_number", Int),
    col("cp_catalog_page_number", Int),
    col("cp_description", Str),
    col("cp_type", Str),
];

const CATALOG_RETURNS: &[Column] = &[
    col("cr_returned_date_sk", Int),
    col("cr_returned_time_sk", Int),
    key("cr_item_sk", Int),
    col("cr_refunded_customer_sk", Int),
    col("cr_refunded_cdemo_sk", Int),
    col("cr_refunded_hdemo_sk", Int),
    col("cr_refunded_addr_sk", Int),
    col("cr_returning_customer_sk", Int),
    col("cr_returning_cdemo_sk", Int),
    col("cr_returning_hdemo_sk", Int),
    col("cr_returning_addr_sk", Int),
    col("cr_call_center_sk", Int),
    col("cr_catalog_page_sk", Int),
    col("cr_ship_mode_sk", Int),
    col("cr_warehouse_sk", Int),
    col("cr_reason_sk", Int),
    key("cr_order_number", BigInt),
    col("cr_return_quantity", Int),
    col("cr_return_amount", Decimal(7, 2)),
    col("cr_return_tax", Decimal(7, 2)),
    col("cr_return_amt_inc_tax", Decimal(7, 2)),
    col("cr_fee", Decimal(7, 2)),
    col("cr_return_ship_cost", Decimal(7, 2)),
    col("cr_refunded_cash", Decimal(7, 2)),
    col("cr_reversed_charge", Decimal(7, 2)),
    col("cr_store_credit", Decimal(7, 2)),
    col("cr_net_loss", Decimal(7, 2)),
];

const CATALOG_SALES: &[Column] = &[
    col("cs_sold_date_sk", Int),
    col("cs_sold_time_sk", Int),
    col("cs_ship_date_sk", Int),
    col("cs_bill_customer_sk", Int),
    col("cs_bill_cdemo_sk", Int),
    col("cs_bill_hdemo_sk", Int),
    col("cs_bill_addr_sk", Int),
    col("cs_ship_customer_sk", Int),
    col("cs_ship_cdemo_sk", Int),
    col("cs_ship_hdemo_sk", Int),
    col("cs_ship_addr_sk", Int),
    col("cs_call_center_sk", Int),
    col("cs_catalog_page_sk", Int),
    col("cs_ship_mode_sk", Int),
    col("cs_warehouse_sk", Int),
    key("cs_item_sk", Int),
    col("cs_promo_sk", Int),
    key("cs_order_number", BigInt),
    col("cs_quantity", Int),
    col("cs_wholesale_cost", Decimal(7, 2)),
    col("cs_list_price", Decimal(7, 2)),
    col("cs_sales_price", Decimal(7, 2)),
    col("cs_ext_discount_amt", Decimal(7, 2)),
    col("cs_ext_sales_price", Decimal(7, 2)),
    col("cs_ext_wholesale_cost", Decimal(7, 2)),
    col("cs_ext_list_price", Decimal(7, 2)),
    col("cs_ext_tax", Decimal(7, 2)),
    col("cs_coupon_amt", Decimal(7, 2)),
    col("cs_ext_ship_cost", Decimal(7, 2)),
    col("cs_net_paid", Decimal(7, 2)),
    col("cs_net_paid_inc_tax", Decimal(7, 2)),
    col("cs_net_paid_inc_ship", Decimal(7, 2)),
    col("cs_net_paid_inc_ship_tax", Decimal(7, 2)),
    col("cs_net_profit", Decimal(7, 2)),
];

const CUSTOMER: &[Column] = &[
    key("c_customer_sk", Int),
    key("c_customer_id", Str),
    col("c_current_cdemo_sk", Int),
    col("c_current_hdemo_sk", Int),
    col("c_current_addr_sk", Int),
    col("c_first_shipto_date_sk", Int),
    col("c_first_sales_date_sk", Int),
    col("c_salutation", Str),
    col("c_first_name", Str),
    col("c_last_name", Str),
    col("c_preferred_cust_flag", Str),
    col("c_birth_day", Int),
    col("c_birth_month", Int),
    col("c_birth_year", Int),
    col("c_birth_country", Str),
    col("c_login", Str),
    col("c_email_address", Str),
    col("c_last_review_date_sk", Int),
];

const CUSTOMER_ADDRESS: &[Column] = &[
    key("ca_address_sk", Int),
    key("ca_address_id", Str),
    col("ca_street_number", Str),
    col("ca_street_name", Str),
    col("ca_street_type", Str),
    col("ca_suite_number", Str),
    col("ca_city", Str),
    col("ca_county", Str),
    col("ca_state", Str),
    col("ca_zip", Str),
    col("ca_country", Str),
    col("ca_gmt_offset", Decimal(5, 2)),
    col("ca_location_type", Str),
];

const CUSTOMER_DEMOGRAPHICS: &[Column] = &[
    key("cd_demo_sk", Int),
    col("cd_gender", Str),
    col("cd_marital_status", Str),
    col("cd_education_status", Str),
    col("cd_purchase_estimate", Int),
    col("cd_credit_rating", Str),
    col("cd_dep_count", Int),
    col("cd_dep_employed_count", Int),
    col("cd_dep_college_count", Int),
];

const DATE_DIM: &[Column] = &[
    key("d_date_sk", Int),
    key("d_date_id", Str),
    col("d_date", Date),
    col("d_month_seq", Int),
    col("d_week_seq", Int),
    col("d_quarter_seq", Int),
    col("d_year", Int),
    col("d_dow", Int),
    col("d_moy", Int),
    col("d_dom", Int),
    col("d_qoy", Int),
    col("d_fy_year", Int),
    col("d_fy_quarter_seq", Int),
    col("d_fy_week_seq", Int),
    col("d_day_name", Str),
    col("d_quarter_name", Str),
    col("d_holiday", Str),
    col("d_weekend", Str),
    col("d_following_holiday", Str),
    col("d_first_dom", Int),
    col("d_last_dom", Int),
    col("d_same_day_ly", Int),
    col("d_same_day_lq", Int),
    col("d_current_day", Str),
    col("d_current_week", Str),
    col("d_current_month", Str),
    col("d_current_quarter", Str),
    col("d_current_year", Str),
];

const HOUSEHOLD_DEMOGRAPHICS: &[Column] = &[
    key("hd_demo_sk", Int),
    col("hd_income_band_sk", Int),
    col("hd_buy_potential", Str),
    col("hd_dep_count", Int),
    col("hd_vehicle_count", Int),
];

const INCOME_BAND: &[Column] = &[
    key("ib_income_band_sk", Int),
    col("ib_lower_bound", Int),
    col("ib_upper_bound", Int),
];

const INVENTORY: &[Column] = &[
    key("inv_date_sk", Int),
    key("inv_item_sk", Int),
    key("inv_warehouse_sk", Int),
    col("inv_quantity_on_hand", Int),
];

const ITEM: &[Column] = &[
    key("i_item_sk", Int),
    key("i_item_id", Str),
    col("i_rec_start_date", Date),
    col("i_rec_end_date", Date),
    col("i_item_desc", Str),
    col("i_current_price", Decimal(7, 2)),
    col("i_wholesale_cost", Decimal(7, 2)),
    col("i_brand_id", Int),
    col("i_brand", Str),
    col("i_class_id", Int),
    col("i_class", Str),
    col("i_category_id", Int),
    col("i_category", Str),
    col("i_manufact_id", Int),
    col("i_manufact", Str),
    col("i_size", Str),
    col("i_formulation", Str),
    col("i_color", Str),
    col("i_units", Str),
    col("i_container", Str),
    col("i_manager_id", Int),
    col("i_product_name", Str),
];

const PROMOTION: &[Column] = &[
    key("p_promo_sk", Int),
    key("p_promo_id", Str),
    col("p_start_date_sk", Int),
    col("p_end_date_sk", Int),
    col("p_item_sk", Int),
    col("p_cost", Decimal(15, 2)),
    col("p_response_target", Int),
    col("p_promo_name", Str),
    col("p_channel_dmail", Str),
    col("p_channel_email", Str),
    col("p_channel_catalog", Str),
    col("p_channel_tv", Str),
    col("p_channel_radio", Str),
    col("p_channel_press", Str),
    col("p_channel_event", Str),
    col("p_channel_demo", Str),
    col("p_channel_details", Str),
    col("p_purpose", Str),
    col("p_discount_active", Str),
];

const REASON: &[Column] = &[
    key("r_reason_sk", Int),
    key("r_reason_id", Str),
    col("r_reason_desc", Str),
];

const SHIP_MODE: &[Column] = &[
    key("sm_ship_mode_sk", Int),
    key("sm_ship_mode_id", Str),
    col("sm_type", Str),
    col("sm_code", Str),
    col("sm_carrier", Str),
    col("sm_contract", Str),
];

const STORE: &[Column] = &[
    key("s_store_sk", Int),
    key("s_store_id", Str),
    col("s_rec_start_date", Date),
    col("s_rec_end_date", Date),
    col("s_closed_date_sk", Int),
    col("s_store_name", Str),
    col("s_number_employees", Int),
    col("s_floor_space", Int),
    col("s_hours", Str),
    col("s_manager", Str),
    col("s_market_id", Int),
    col("s_geography_class", Str),
    col("s_market_desc", Str),
    col("s_market_manager", Str),
    col("s_division_id", Int),
    col("s_division_name", Str),
    col("s_company_id", Int),
    col("s_company_name", Str),
    col("s_street_number", Str),
    col("s_street_name", Str),
    col("s_street_type", Str),
    col("s_suite_number", Str),
    col("s_city", Str),
    col("s_county", Str),
    col("s_state", Str),
    col("s_zip", Str),
    col("s_country", Str),
    col("s_gmt_offset", Decimal(5, 2)),
    col("s_tax_precentage", Decimal(5, 2)),
];

const STORE_RETURNS: &[Column] = &[
    col("sr_returned_date_sk", Int),
    col("sr_return_time_sk", Int),
    key("sr_item_sk", Int),
    col("sr_customer_sk", Int),
    col("sr_cdemo_sk", Int),
    col("sr_hdemo_sk", Int),
    col("sr_addr_sk", Int),
    col("sr_store_sk", Int),
    col("sr_reason_sk", Int),
    key("sr_ticket_number", BigInt),
    col("sr_return_quantity", Int),
    col("sr_return_amt", Decimal(7, 2)),
    col("sr_return_tax", Decimal(7, 2)),
    col("sr_return_amt_inc_tax", Decimal(7, 2)),
    col("sr_fee", Decimal(7, 2)),
    col("sr_return_ship_cost", Decimal(7, 2)),
    col("sr_refunded_cash", Decimal(7, 2)),
    col("sr_reversed_charge", Decimal(7, 2)),
    col("sr_store_credit", Decimal(7, 2)),
    col("sr_net_loss", Decimal(7, 2)),
];

const STORE_SALES: &[Column] = &[
    col("ss_sold_date_sk", Int),
    col("ss_sold_time_sk", Int),
    key("ss_item_sk", Int),
    col("ss_customer_sk", Int),
    col("ss_cdemo_sk", Int),
    col("ss_hdemo_sk", Int),
    col("ss_addr_sk", Int),
    col("ss_store_sk", Int),
    col("ss_promo_sk", Int),
    key("ss_ticket_number", BigInt),
    col("ss_quantity", Int),
    col("ss_wholesale_cost", Decimal(7, 2)),
    col("ss_list_price", Decimal(7, 2)),
    col("ss_sales_price", Decimal(7, 2)),
    col("ss_ext_discount_amt", Decimal(7, 2)),
    col("ss_ext_sales_price", Decimal(7, 2)),
    col("ss_ext_wholesale_cost", Decimal(7, 2)),
    col("ss_ext_list_price", Decimal(7, 2)),
    col("ss_ext_tax", Decimal(7, 2)),
    col("ss_coupon_amt", Decimal(7, 2)),
    col("ss_net_paid", Decimal(7, 2)),
    col("ss_net_paid_inc_tax", Decimal(7, 2)),
    col("ss_net_profit", Decimal(7, 2)),
];

const TIME_DIM: &[Column] = &[
    key("t_time_sk", Int),
    key("t_time_id", Str),
    col("t_time", Int),
    col("t_hour", Int),
    col("t_minute", Int),
    col("t_second", Int),
    col("t_am_pm", Str),
    col("t_shift", Str),
    col("t_sub_shift", Str),
    col("t_meal_time", Str),
];

const WAREHOUSE: &[Column] = &[
    key("w_warehouse_sk", Int),
    key("w_warehouse_id", Str),
    col("w_warehouse_name", Str),
    col("w_warehouse_sq_ft", Int),
    col("w_street_number", Str),
    col("w_street_name", Str),
    col("w_street_type", Str),
    col("w_suite_number", Str),
    col("w_city", Str),
    col("w_county", Str),
    col("w_state", Str),
    col("w_zip", Str),
    col("w_country", Str),
    col("w_gmt_offset", Decimal(5, 2)),
];

const WEB_PAGE: &[Column] = &[
    key("wp_web_page_sk", Int),
    key("wp_web_page_id", Str),
    col("wp_rec_start_date", Date),
    col("wp_rec_end_date", Date),
    col("wp_creation_date_sk", Int),
    col("wp_access_date_sk", Int),
    col("wp_autogen_flag", Str),
    col("wp_customer_sk", Int),
    col("wp_url", Str),
    col("wp_type", Str),
    col("wp_char_count", Int),
    col("wp_link_count", Int),
    col("wp_image_count", Int),
    col("wp_max_ad_count", Int),
];

const WEB_RETURNS: &[Column] = &[
    col("wr_returned_date_sk", Int),
    col("wr_returned_time_sk", Int),
    key("wr_item_sk", Int),
    col("wr_refunded_customer_sk", Int),
    col("wr_refunded_cdemo_sk", Int),
    col("wr_refunded_hdemo_sk", Int),
    col("wr_refunded_addr_sk", Int),
    col("wr_returning_customer_sk", Int),
    col("wr_returning_cdemo_sk", Int),
    col("wr_returning_hdemo_sk", Int),
    col("wr_returning_addr_sk", Int),
    col("wr_web_page_sk", Int),
    col("wr_reason_sk", Int),
    key("wr_order_number", BigInt),
    col("wr_return_quantity", Int),
    col("wr_return_amt", Decimal(7, 2)),
    col("wr_return_tax", Decimal(7, 2)),
    col("wr_return_amt_inc_tax", Decimal(7, 2)),
    col("wr_fee", Decimal(7, 2)),
    col("wr_return_ship_cost", Decimal(7, 2)),
    col("wr_refunded_cash", Decimal(7, 2)),
    col("wr_reversed_charge", Decimal(7, 2)),
    col("wr_account_credit", Decimal(7, 2)),
    col("wr_net_loss", Decimal(7, 2)),
];

const WEB_SALES: &[Column] = &[
    col("ws_sold_date_sk", Int),
    col("ws_sold_time_sk", Int),
    col("ws_ship_date_sk", Int),
    key("ws_item_sk", Int),
    col("ws_bill_customer_sk", Int),
    col("ws_bill_cdemo_sk", Int),
    col("ws_bill_hdemo_sk", Int),
    col("ws_bill_addr_sk", Int),
    col("ws_ship_customer_sk", Int),
    col("ws_ship_cdemo_sk", Int),
    col("ws_ship_hdemo_sk", Int),
    col("ws_ship_addr_sk", Int),
    col("ws_web_page_sk", Int),
    col("ws_web_site_sk", Int),
    col("ws_ship_mode_sk", Int),
    col("ws_warehouse_sk", Int),
    col("ws_promo_sk", Int),
    key("ws_order_number", BigInt),
    col("ws_quantity", Int),
    col("ws_wholesale_cost", Decimal(7, 2)),
    col("ws_list_price", Decimal(7, 2)),
    col("ws_sales_price", Decimal(7, 2)),
    col("ws_ext_discount_amt", Decimal(7, 2)),
    col("ws_ext_sales_price", Decimal(7, 2)),
    col("ws_ext_wholesale_cost", Decimal(7, 2)),
    col("ws_ext_list_price", Decimal(7, 2)),
    col("ws_ext_tax", Decimal(7, 2)),
    col("ws_coupon_amt", Decimal(7, 2)),
    col("ws_ext_ship_cost", Decimal(7, 2)),
    col("ws_net_paid", Decimal(7, 2)),
    col("ws_net_paid_inc_tax", Decimal(7, 2)),
    col("ws_net_paid_inc_ship", Decimal(7, 2)),
    col("ws_net_paid_inc_ship_tax", Decimal(7, 2)),
    col("ws_net_profit", Decimal(7, 2)),
];

const WEB_SITE: &[Column] = &[
    key("web_site_sk", Int),
    key("web_site_id", Str),
    col("web_rec_start_date", Date),
    col("web_rec_end_date", Date),
    col("web_name", Str),
    col("web_open_date_sk", Int),
    col("web_close_date_sk", Int),
    col("web_class", Str),
    col("web_manager", Str),
    col("web_mkt_id", Int),
    col("web_mkt_class", Str),
    col("web_mkt_desc", Str),
    col("web_market_manager", Str),
    col("web_company_id", Int),
    col("web_company_name", Str),
    col("web_street_number", Str),
    col("web_street_name", Str),
    col("web_street_type", Str),
    col("web_suite_number", Str),
    col("web_city", Str),
    col("web_county", Str),
    col("web_state", Str),
    col("web_zip", Str),
    col("web_country", Str),
    col("web_gmt_offset", Decimal(5, 2)),
    col("web_tax_percentage", Decimal(5, 2)),
];
