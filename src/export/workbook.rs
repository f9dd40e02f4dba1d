use crate::error::{ScheduleError, ScheduleResult};
use crate::plan::Schedule;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, XlsxError};
use std::path::Path;

const CURRENCY_FORMAT: &str = "$#,##0.00";

const MONEY_COLUMNS: [&str; 5] = ["StartBalance", "Payment", "Interest", "Principal", "EndBalance"];

fn money(amt: Decimal) -> f64 {
    amt.to_f64().unwrap_or(0.)
}

/// One worksheet per schedule, named after its plan. A Date column is added when the
/// schedules carry payment dates.
pub fn build_workbook(schedules: &[Schedule]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border_bottom(FormatBorder::Thin);
    let currency = Format::new().set_num_format(CURRENCY_FORMAT);

    let has_dates = schedules
        .iter()
        .flat_map(|s| s.rows.first())
        .any(|r| r.pmt_date.is_some());
    let first_money_col: u16 = if has_dates { 2 } else { 1 };

    for schedule in schedules {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(schedule.plan.label())?;

        worksheet.write_string_with_format(0, 0, "Period", &header)?;
        if has_dates {
            worksheet.write_string_with_format(0, 1, "Date", &header)?;
            worksheet.set_column_width(1, 12)?;
        }
        for (offset, title) in MONEY_COLUMNS.iter().enumerate() {
            let col = first_money_col + offset as u16;
            worksheet.write_string_with_format(0, col, *title, &header)?;
            worksheet.set_column_width(col, 15)?;
        }

        for (idx, row) in schedule.rows.iter().enumerate() {
            let xl_row = idx as u32 + 1;
            worksheet.write_number(xl_row, 0, row.pmt_number)?;
            if let Some(date) = row.pmt_date {
                worksheet.write_string(xl_row, 1, date.format("%Y-%m-%d").to_string())?;
            }
            let amounts = [
                row.begin_balance,
                row.pmt_amount,
                row.pmt_interest_paid,
                row.pmt_principal_paid,
                row.pmt_end_balance,
            ];
            for (offset, amt) in amounts.into_iter().enumerate() {
                worksheet.write_number_with_format(
                    xl_row,
                    first_money_col + offset as u16,
                    money(amt),
                    &currency,
                )?;
            }
        }
        worksheet.set_freeze_panes(1, 0)?;
    }
    Ok(workbook)
}

pub fn write_workbook(schedules: &[Schedule], path: &Path) -> ScheduleResult<()> {
    let wrap = |source| ScheduleError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = build_workbook(schedules).map_err(wrap)?;
    workbook.save(path).map_err(wrap)
}
