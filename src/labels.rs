//! Localized strings shared by the validator, the exporter and the pages.

pub const TITLE: &str = "نموذج تسجيل بيانات";
pub const REGISTER_TITLE: &str = "تسجيل بيانات جديدة";
pub const DATA_TABLE: &str = "البيانات المسجلة";

pub const FULL_NAME: &str = "الاسم الكامل";
pub const ID_NUMBER: &str = "رقم الهوية";
pub const PHONE: &str = "رقم الهاتف";
pub const GENDER: &str = "الجنس";
pub const MALE: &str = "ذكر";
pub const FEMALE: &str = "أنثى";
pub const TABLE_NUM: &str = "#";

pub const NO_DATA: &str = "لا توجد بيانات مسجلة بعد";
pub const NOT_FOUND: &str = "لم يتم العثور على البيانات";

// Notifications
pub const SAVED: &str = "تم حفظ البيانات بنجاح!";
pub const SAVE_FAILED: &str = "حدث خطأ أثناء حفظ البيانات";
pub const NOTHING_TO_EXPORT: &str = "لا توجد بيانات للتصدير";
pub const EXPORT_FAILED: &str = "حدث خطأ أثناء تصدير البيانات";
pub const LOGGED_IN: &str = "تم تسجيل الدخول بنجاح";
pub const WRONG_PASSWORD: &str = "كلمة المرور غير صحيحة";
pub const UNAUTHORIZED: &str = "غير مصرح بالدخول";

// Validation
pub const FULL_NAME_REQUIRED: &str = "يرجى إدخال الاسم الكامل";
pub const ID_NUMBER_LENGTH: &str = "رقم الهوية يجب أن يكون 14 رقمًا";
pub const PHONE_LENGTH: &str = "رقم الهاتف يجب أن يكون 11 رقمًا";
pub const GENDER_REQUIRED: &str = "يرجى تحديد الجنس";

// Export
pub const SHEET_NAME: &str = "بيانات";
pub const EXPORT_FILE_NAME: &str = "بيانات_التسجيل.xlsx";
pub const EXPORT_CSV_FILE_NAME: &str = "بيانات_التسجيل.csv";

/// Header row of every export, in column order
pub const EXPORT_HEADER: [&str; 5] = [TABLE_NUM, FULL_NAME, ID_NUMBER, PHONE, GENDER];
