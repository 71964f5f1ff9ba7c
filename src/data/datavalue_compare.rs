use crate::data::datatable::DataValue;
use std::cmp::Ordering;

/// Lower bound of the i64 range as an f64 (exactly -2^63)
const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;

/// Compare two DataValues for sorting.
///
/// Returns `None` when the pair has no meaningful order (for example a string
/// against a number). Null sorts before every other value and integers and
/// floats compare by exact numeric value. Floats follow `total_cmp` except that
/// `-0.0` and `0.0` are equal, so the order stays total across mixed columns.
pub fn compare_datavalues(a: &DataValue, b: &DataValue) -> Option<Ordering> {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => Some(a.cmp(b)),
        (DataValue::Float(a), DataValue::Float(b)) => Some(compare_floats(*a, *b)),
        (DataValue::String(a), DataValue::String(b)) => Some(a.cmp(b)),
        (DataValue::Boolean(a), DataValue::Boolean(b)) => Some(a.cmp(b)),
        (DataValue::Date(a), DataValue::Date(b)) => Some(a.cmp(b)),
        (DataValue::DateTime(a), DataValue::DateTime(b)) => Some(a.cmp(b)),

        // Compare actual numeric values, not types
        (DataValue::Integer(i), DataValue::Float(f)) => Some(compare_int_float(*i, *f)),
        (DataValue::Float(f), DataValue::Integer(i)) => Some(compare_int_float(*i, *f).reverse()),

        (DataValue::Null, DataValue::Null) => Some(Ordering::Equal),
        (DataValue::Null, _) => Some(Ordering::Less),
        (_, DataValue::Null) => Some(Ordering::Greater),

        _ => None,
    }
}

/// Values sharing an ordering class can always be compared with each other.
/// Integers and floats share one class; Null has none since it orders
/// against everything.
pub fn ordering_class(value: &DataValue) -> Option<&'static str> {
    match value {
        DataValue::Null => None,
        DataValue::Integer(_) | DataValue::Float(_) => Some("number"),
        other => Some(other.type_name()),
    }
}

fn compare_floats(a: f64, b: f64) -> Ordering {
    if a == b {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Exact comparison of an integer against a float, without rounding the
/// integer through f64. NaN is placed where `total_cmp` puts it.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= -I64_MIN_F64 {
        return Ordering::Less;
    }
    if f < I64_MIN_F64 {
        return Ordering::Greater;
    }

    // f is now finite and inside the i64 range, so its integral part is exact
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => {
            let fraction = f - whole;
            if fraction > 0.0 {
                Ordering::Less
            } else if fraction < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        ordering => ordering,
    }
}

/// The float as an i64 when it is a whole number inside the i64 range
pub fn whole_number(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (I64_MIN_F64..-I64_MIN_F64).contains(&f)).then(|| f as i64)
}

/// Equality used for grouping and distinct values.
///
/// Same as `==` except that integers and floats holding exactly the same
/// number are equal, and NaN equals NaN so every NaN lands in one group.
pub fn datavalues_equal(a: &DataValue, b: &DataValue) -> bool {
    match (a, b) {
        (DataValue::Float(a), DataValue::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        (DataValue::Integer(i), DataValue::Float(f)) | (DataValue::Float(f), DataValue::Integer(i)) => {
            !f.is_nan() && compare_int_float(*i, *f) == Ordering::Equal
        }
        _ => a == b,
    }
}
