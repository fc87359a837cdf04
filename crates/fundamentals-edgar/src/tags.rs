//! Default us-gaap tag table.
//!
//! Different filers use different XBRL tags for the same concept, and the
//! same filer changes tags across taxonomy versions. Within a field, tags are
//! listed in precedence order.

use fundamentals_core::{TagMapping, fields};
use tracing::warn;

/// us-gaap tags and the canonical field each maps to.
pub const EDGAR_TAGS: &[(&str, &str)] = &[
    // Revenue
    ("Revenues", fields::REVENUE),
    ("RevenueFromContractWithCustomerExcludingAssessedTax", fields::REVENUE),
    ("SalesRevenueNet", fields::REVENUE),
    ("RevenueFromContractWithCustomerIncludingAssessedTax", fields::REVENUE),
    ("RevenuesNetOfInterestExpense", fields::REVENUE),
    ("RevenueNet", fields::REVENUE),
    ("TotalRevenues", fields::REVENUE),
    ("NetSales", fields::REVENUE),
    ("SalesRevenueGoodsGross", fields::REVENUE),
    ("TotalRevenuesAndOtherIncome", fields::REVENUE),
    // Revenue components
    ("SalesRevenueGoodsNet", fields::REVENUE_PRODUCTS),
    ("SalesRevenueServicesNet", fields::REVENUE_SERVICES),
    (
        "RevenueFromContractWithCustomerExcludingAssessedTaxTransferredAtPointInTime",
        fields::REVENUE_POINT_IN_TIME,
    ),
    (
        "RevenueFromContractWithCustomerExcludingAssessedTaxTransferredOverTime",
        fields::REVENUE_OVER_TIME,
    ),
    // Cost of revenue and profit
    ("CostOfRevenue", fields::COGS),
    ("CostOfGoodsAndServicesSold", fields::COGS),
    ("CostOfGoodsSold", fields::COGS),
    ("GrossProfit", fields::GROSS_PROFIT),
    ("OperatingIncomeLoss", fields::OPERATING_INCOME),
    ("NetIncomeLoss", fields::NET_INCOME),
    ("ProfitLoss", fields::NET_INCOME),
    ("NetIncomeLossAvailableToCommonStockholdersBasic", fields::NET_INCOME),
    // Cash flow
    ("NetCashProvidedByUsedInOperatingActivities", fields::CFO),
    ("CashProvidedByUsedInOperatingActivities", fields::CFO),
    // Assets
    ("Assets", fields::TOTAL_ASSETS),
    ("AssetsCurrent", fields::CURRENT_ASSETS),
    ("CashAndCashEquivalentsAtCarryingValue", fields::CASH),
    ("Cash", fields::CASH),
    ("CashCashEquivalentsAndShortTermInvestments", fields::CASH),
    ("AccountsReceivableNetCurrent", fields::ACCOUNTS_RECEIVABLE),
    ("AccountsReceivableNet", fields::ACCOUNTS_RECEIVABLE),
    ("ReceivablesNetCurrent", fields::ACCOUNTS_RECEIVABLE),
    ("InventoryNet", fields::INVENTORY),
    ("Inventories", fields::INVENTORY),
    // Liabilities
    ("Liabilities", fields::TOTAL_LIABILITIES),
    ("LiabilitiesCurrent", fields::CURRENT_LIABILITIES),
    ("AccountsPayableCurrent", fields::ACCOUNTS_PAYABLE),
    ("AccountsPayableAndAccruedLiabilitiesCurrent", fields::ACCOUNTS_PAYABLE),
    ("LongTermDebt", fields::LONG_TERM_DEBT),
    ("LongTermDebtNoncurrent", fields::LONG_TERM_DEBT),
    ("LongTermDebtAndCapitalLeaseObligations", fields::LONG_TERM_DEBT),
    // Equity
    ("StockholdersEquity", fields::STOCKHOLDERS_EQUITY),
    (
        "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
        fields::STOCKHOLDERS_EQUITY,
    ),
];

/// Builds a [`TagMapping`] from [`EDGAR_TAGS`].
#[must_use]
pub fn edgar_tag_mapping() -> TagMapping {
    let mut mapping = TagMapping::new();
    for &(tag, field) in EDGAR_TAGS {
        if let Err(e) = mapping.register(tag, field) {
            warn!(tag, field, error = %e, "Skipping default tag entry");
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_no_conflicts() {
        let mapping = edgar_tag_mapping();
        assert_eq!(mapping.len(), EDGAR_TAGS.len());
    }

    #[test]
    fn test_receivables_never_map_to_revenue() {
        let mapping = edgar_tag_mapping();
        for tag in mapping.tags_for(fields::REVENUE) {
            assert!(!tag.contains("Receivable"), "{tag} maps to revenue");
        }
        assert_eq!(
            mapping.field_for("AccountsReceivableNetCurrent"),
            Some(fields::ACCOUNTS_RECEIVABLE)
        );
    }

    #[test]
    fn test_revenue_components_are_separate_fields() {
        let mapping = edgar_tag_mapping();
        assert_eq!(mapping.field_for("NetSales"), Some(fields::REVENUE));
        assert_eq!(
            mapping.field_for("SalesRevenueGoodsNet"),
            Some(fields::REVENUE_PRODUCTS)
        );
        assert_eq!(
            mapping.field_for("SalesRevenueServicesNet"),
            Some(fields::REVENUE_SERVICES)
        );
        assert_eq!(
            mapping.tags_for(fields::COGS).collect::<Vec<_>>(),
            vec!["CostOfRevenue", "CostOfGoodsAndServicesSold", "CostOfGoodsSold"]
        );
    }
}
