use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::combinator::{cut, map, map_res};
use nom::error::context;
use nom::multi::separated_list1;
use nom::sequence::{pair, preceded};

use crate::grammar::{comma, equals, ignored_key_value_pair, semicolon, tag};

use crate::{ICalendarEntity, ParserError, ParserInput, ParserResult, impl_icalendar_entity_traits};

use crate::values::date_time::DateTime;
use crate::values::integer::Integer;
use crate::values::list::List;
use crate::values::tzid::Tzid;

macro_rules! define_recur_param {
    ($struct_name:ident, $key_str:expr, $value_parser:expr, $value_type:ty $(,)*) => {
        #[derive(Debug, Clone, Eq, PartialEq, Hash)]
        pub struct $struct_name(pub $value_type);

        impl ICalendarEntity for $struct_name {
            fn parse_ical(input: ParserInput) -> ParserResult<Self> {
                map(
                    pair(
                        tag($key_str),
                        preceded(equals, cut($value_parser)),
                    ),
                    |(_key, value)| Self(value)
                )(input)
            }

            fn render_ical(&self) -> String {
                format!("{}={}", $key_str, self.0.render_ical())
            }
        }

        impl_icalendar_entity_traits!($struct_name);
    }
}

define_recur_param!(FreqParam, "FREQ", freq, Frequency);
define_recur_param!(UntilParam, "UNTIL", enddate, DateTime);
define_recur_param!(CountParam, "COUNT", count, Integer);
define_recur_param!(IntervalParam, "INTERVAL", interval, Integer);
define_recur_param!(BysecondParam, "BYSECOND", byseclist, List<Integer>);
define_recur_param!(ByminuteParam, "BYMINUTE", byminlist, List<Integer>);
define_recur_param!(ByhourParam, "BYHOUR", byhrlist, List<Integer>);
define_recur_param!(BydayParam, "BYDAY", bywdaylist, List<WeekDayNum>);
define_recur_param!(BymonthdayParam, "BYMONTHDAY", bymodaylist, List<Integer>);
define_recur_param!(ByyeardayParam, "BYYEARDAY", byyrdaylist, List<Integer>);
define_recur_param!(ByweeknoParam, "BYWEEKNO", bywknolist, List<Integer>);
define_recur_param!(BymonthParam, "BYMONTH", bymolist, List<Integer>);
define_recur_param!(BysetposParam, "BYSETPOS", bysplist, List<Integer>);
define_recur_param!(WkstParam, "WKST", WeekDay::parse_ical, WeekDay);
define_recur_param!(RscaleParam, "RSCALE", rscale_value, RScale);
define_recur_param!(SkipParam, "SKIP", Skip::parse_ical, Skip);
define_recur_param!(TzidParam, "TZID", Tzid::parse_ical, Tzid);

/// recur-rule-part = ( "FREQ" "=" freq )
///                 / ( "UNTIL" "=" enddate )
///                 / ( "COUNT" "=" 1*DIGIT )
///                 / ( "INTERVAL" "=" 1*DIGIT )
///                 / ( "BYSECOND" "=" byseclist )
///                 / ( "BYMINUTE" "=" byminlist )
///                 / ( "BYHOUR" "=" byhrlist )
///                 / ( "BYDAY" "=" bywdaylist )
///                 / ( "BYMONTHDAY" "=" bymodaylist )
///                 / ( "BYYEARDAY" "=" byyrdaylist )
///                 / ( "BYWEEKNO" "=" bywknolist )
///                 / ( "BYMONTH" "=" bymolist )
///                 / ( "BYSETPOS" "=" bysplist )
///                 / ( "WKST" "=" weekday )
///                 / ( "RSCALE" "=" rscale )       ;RFC 7529
///                 / ( "SKIP" "=" skip )           ;RFC 7529
///                 / ( "TZID" "=" paramtext )
///
/// Rule parts with an unrecognised key parse to `Other` and are discarded.
enum RecurRulePart {
    Freq(FreqParam),
    Until(UntilParam),
    Count(CountParam),
    Interval(IntervalParam),
    Bysecond(BysecondParam),
    Byminute(ByminuteParam),
    Byhour(ByhourParam),
    Byday(BydayParam),
    Bymonthday(BymonthdayParam),
    Byyearday(ByyeardayParam),
    Byweekno(ByweeknoParam),
    Bymonth(BymonthParam),
    Bysetpos(BysetposParam),
    Wkst(WkstParam),
    Rscale(RscaleParam),
    Skip(SkipParam),
    Tzid(TzidParam),
    Other,
}

impl ICalendarEntity for RecurRulePart {
    fn parse_ical(input: ParserInput) -> ParserResult<Self> {
        context(
            "RECUR-RULE-PART",
            alt((
                map(FreqParam::parse_ical, Self::Freq),
                map(UntilParam::parse_ical, Self::Until),
                map(CountParam::parse_ical, Self::Count),
                map(IntervalParam::parse_ical, Self::Interval),
                map(BysecondParam::parse_ical, Self::Bysecond),
                map(ByminuteParam::parse_ical, Self::Byminute),
                map(ByhourParam::parse_ical, Self::Byhour),
                map(BydayParam::parse_ical, Self::Byday),
                map(BymonthdayParam::parse_ical, Self::Bymonthday),
                map(ByyeardayParam::parse_ical, Self::Byyearday),
                map(ByweeknoParam::parse_ical, Self::Byweekno),
                map(BymonthParam::parse_ical, Self::Bymonth),
                map(BysetposParam::parse_ical, Self::Bysetpos),
                map(WkstParam::parse_ical, Self::Wkst),
                map(RscaleParam::parse_ical, Self::Rscale),
                map(SkipParam::parse_ical, Self::Skip),
                map(TzidParam::parse_ical, Self::Tzid),
                map(ignored_key_value_pair, |_| Self::Other),
            ))
        )(input)
    }

    fn render_ical(&self) -> String {
        match self {
            Self::Freq(param) => param.render_ical(),
            Self::Until(param) => param.render_ical(),
            Self::Count(param) => param.render_ical(),
            Self::Interval(param) => param.render_ical(),
            Self::Bysecond(param) => param.render_ical(),
            Self::Byminute(param) => param.render_ical(),
            Self::Byhour(param) => param.render_ical(),
            Self::Byday(param) => param.render_ical(),
            Self::Bymonthday(param) => param.render_ical(),
            Self::Byyearday(param) => param.render_ical(),
            Self::Byweekno(param) => param.render_ical(),
            Self::Bymonth(param) => param.render_ical(),
            Self::Bysetpos(param) => param.render_ical(),
            Self::Wkst(param) => param.render_ical(),
            Self::Rscale(param) => param.render_ical(),
            Self::Skip(param) => param.render_ical(),
            Self::Tzid(param) => param.render_ical(),
            Self::Other => String::new(),
        }
    }
}

/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
pub fn freq(input: ParserInput) -> ParserResult<Frequency> {
    Frequency::parse_ical(input)
}

/// interval       = 1*DIGIT
pub fn interval(input: ParserInput) -> ParserResult<Integer> {
    let (remaining, interval) = take_while1(|value: char| value.is_ascii_digit())(input)?;

    let Ok(parsed_interval) = interval.to_string().parse::<u64>() else {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("invalid interval"), input)
            )
        );
    };

    Ok((remaining, Integer::from(parsed_interval)))
}

/// count       = 1*DIGIT
pub fn count(input: ParserInput) -> ParserResult<Integer> {
    let (remaining, count) = take_while1(|value: char| value.is_ascii_digit())(input)?;

    let Ok(parsed_count) = count.to_string().parse::<u64>() else {
        return Err(
            nom::Err::Error(
                ParserError::new(String::from("invalid count"), input)
            )
        );
    };

    Ok((remaining, Integer::from(parsed_count)))
}

/// enddate     = date / date-time
pub fn enddate(input: ParserInput) -> ParserResult<DateTime> {
    DateTime::parse_ical(input)
}

/// byseclist   = ( seconds *("," seconds) )
pub fn byseclist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, seconds), List::from)(input)
}

/// seconds     = 1*2DIGIT       ;0 to 60
pub fn seconds(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_unsigned_m_n(1, 2, 0, 60)(input)
}

/// byminlist   = ( minutes *("," minutes) )
pub fn byminlist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, minutes), List::from)(input)
}

/// minutes     = 1*2DIGIT       ;0 to 59
pub fn minutes(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_unsigned_m_n(1, 2, 0, 59)(input)
}

/// byhrlist    = ( hour *("," hour) )
pub fn byhrlist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, hour), List::from)(input)
}

/// hour        = 1*2DIGIT       ;0 to 23
pub fn hour(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_unsigned_m_n(1, 2, 0, 23)(input)
}

/// bywdaylist  = ( weekdaynum *("," weekdaynum) )
pub fn bywdaylist(input: ParserInput) -> ParserResult<List<WeekDayNum>> {
    map(separated_list1(comma, weekdaynum), List::from)(input)
}

/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ordwk       = 1*2DIGIT       ;1 to 53
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
pub fn weekdaynum(input: ParserInput) -> ParserResult<WeekDayNum> {
    WeekDayNum::parse_ical(input)
}

/// bymodaylist = ( monthdaynum *("," monthdaynum) )
pub fn bymodaylist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, monthdaynum), List::from)(input)
}

/// monthdaynum = [plus / minus] ordmoday
/// ordmoday    = 1*2DIGIT       ;1 to 31
pub fn monthdaynum(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_signed_m_n(1, 2, 1, 31)(input)
}

/// byyrdaylist = ( yeardaynum *("," yeardaynum) )
pub fn byyrdaylist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, yeardaynum), List::from)(input)
}

/// yeardaynum  = [plus / minus] ordyrday
/// ordyrday    = 1*3DIGIT      ;1 to 366
pub fn yeardaynum(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_signed_m_n(1, 3, 1, 366)(input)
}

/// bywknolist  = ( weeknum *("," weeknum) )
pub fn bywknolist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, weeknum), List::from)(input)
}

/// weeknum     = [plus / minus] ordwk
/// ordwk       = 1*2DIGIT       ;1 to 53
pub fn weeknum(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_signed_m_n(1, 2, 1, 53)(input)
}

/// bymolist    = ( monthnum *("," monthnum) )
pub fn bymolist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, monthnum), List::from)(input)
}

/// monthnum    = 1*2DIGIT       ;1 to 12
pub fn monthnum(input: ParserInput) -> ParserResult<Integer> {
    Integer::parse_unsigned_m_n(1, 2, 1, 12)(input)
}

/// bysplist    = ( setposday *("," setposday) )
/// setposday   = yeardaynum
pub fn bysplist(input: ParserInput) -> ParserResult<List<Integer>> {
    map(separated_list1(comma, yeardaynum), List::from)(input)
}

/// rscale      = iana-token
///
/// The token is kept verbatim; whether the named calendar scale is supported
/// is decided by the expansion layer so it can surface a dedicated error.
pub fn rscale_value(input: ParserInput) -> ParserResult<RScale> {
    map(
        take_while1(|value: char| value.is_ascii_alphanumeric() || value == '-'),
        |token: ParserInput| RScale(token.to_string()),
    )(input)
}

/// Frequency enum
///
/// # Examples
///
/// ```rust
/// use std::str::FromStr;
/// use recal_ical::values::recur::Frequency;
/// use recal_ical::ICalendarEntity;
///
/// assert_eq!(Frequency::from_str("SECONDLY"), Ok(Frequency::Secondly));
/// assert_eq!(Frequency::from_str("MINUTELY"), Ok(Frequency::Minutely));
/// assert_eq!(Frequency::from_str("HOURLY"), Ok(Frequency::Hourly));
/// assert_eq!(Frequency::from_str("DAILY"), Ok(Frequency::Daily));
/// assert_eq!(Frequency::from_str("WEEKLY"), Ok(Frequency::Weekly));
/// assert_eq!(Frequency::from_str("MONTHLY"), Ok(Frequency::Monthly));
/// assert_eq!(Frequency::from_str("YEARLY"), Ok(Frequency::Yearly));
///
/// assert_eq!(Frequency::Daily.render_ical(), String::from("DAILY"));
/// ```
///
/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whether this frequency ticks more often than once a day.
    pub fn is_sub_day(&self) -> bool {
        matches!(self, Self::Secondly | Self::Minutely | Self::Hourly)
    }
}

impl ICalendarEntity for Frequency {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        context(
            "FREQ",
            alt((
                map(tag("SECONDLY"), |_| Self::Secondly),
                map(tag("MINUTELY"), |_| Self::Minutely),
                map(tag("HOURLY"), |_| Self::Hourly),
                map(tag("DAILY"), |_| Self::Daily),
                map(tag("WEEKLY"), |_| Self::Weekly),
                map(tag("MONTHLY"), |_| Self::Monthly),
                map(tag("YEARLY"), |_| Self::Yearly),
            )),
        )(input)
    }

    fn render_ical(&self) -> String {
        match self {
            Self::Secondly => String::from("SECONDLY"),
            Self::Minutely => String::from("MINUTELY"),
            Self::Hourly => String::from("HOURLY"),
            Self::Daily => String::from("DAILY"),
            Self::Weekly => String::from("WEEKLY"),
            Self::Monthly => String::from("MONTHLY"),
            Self::Yearly => String::from("YEARLY"),
        }
    }
}

impl_icalendar_entity_traits!(Frequency);

/// Week-day num struct
///
/// # Examples
///
/// ```rust
/// use std::str::FromStr;
/// use recal_ical::values::recur::{WeekDayNum, WeekDay};
/// use recal_ical::values::integer::Integer;
///
/// assert_eq!(WeekDayNum::from_str("SU"), Ok(WeekDayNum(None, WeekDay::Sunday)));
/// assert_eq!(WeekDayNum::from_str("-1SU"), Ok(WeekDayNum(Some(Integer(-1_i64)), WeekDay::Sunday)));
/// assert_eq!(WeekDayNum::from_str("+2SA"), Ok(WeekDayNum(Some(Integer(2_i64)), WeekDay::Saturday)));
///
/// assert!(WeekDayNum::from_str("0MO").is_err());
/// ```
///
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ordwk       = 1*2DIGIT       ;1 to 53
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct WeekDayNum(pub Option<Integer>, pub WeekDay);

impl ICalendarEntity for WeekDayNum {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        // weekdaynum  = [[plus / minus] ordwk] weekday
        // ordwk       = 1*2DIGIT       ;1 to 53
        context(
            "WEEKDAYNUM",
            |input| {
                let (remaining, ordwk) = nom::combinator::opt(Integer::parse_signed_m_n(1, 2, 1, 53))(input)?;
                let (remaining, weekday) = WeekDay::parse_ical(remaining)?;

                Ok((remaining, WeekDayNum(ordwk, weekday)))
            }
        )(input)
    }

    fn render_ical(&self) -> String {
        let mut output = String::new();

        if let Some(ordwk) = self.0.as_ref() {
            output.push_str(ordwk.render_ical().as_str());
        }

        output.push_str(self.1.render_ical().as_str());

        output
    }
}

impl_icalendar_entity_traits!(WeekDayNum);

/// Week-day enum
///
/// # Examples
///
/// ```rust
/// use std::str::FromStr;
/// use recal_ical::values::recur::WeekDay;
/// use recal_ical::ICalendarEntity;
///
/// assert_eq!(WeekDay::from_str("SU"), Ok(WeekDay::Sunday));
/// assert_eq!(WeekDay::from_str("SA"), Ok(WeekDay::Saturday));
///
/// assert_eq!(WeekDay::Monday.render_ical(), String::from("MO"));
///
/// assert_eq!(WeekDay::Sunday.num_days_from_sunday(), 0);
/// assert_eq!(WeekDay::Saturday.num_days_from_sunday(), 6);
/// ```
///
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ;Corresponding to SUNDAY, MONDAY, TUESDAY, WEDNESDAY, THURSDAY,
/// ;FRIDAY, and SATURDAY days of the week.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    /// Day-of-week index with 0 = Sunday through 6 = Saturday.
    pub fn num_days_from_sunday(&self) -> u32 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }
}

impl From<WeekDay> for chrono::Weekday {
    fn from(weekday: WeekDay) -> Self {
        match weekday {
            WeekDay::Sunday => chrono::Weekday::Sun,
            WeekDay::Monday => chrono::Weekday::Mon,
            WeekDay::Tuesday => chrono::Weekday::Tue,
            WeekDay::Wednesday => chrono::Weekday::Wed,
            WeekDay::Thursday => chrono::Weekday::Thu,
            WeekDay::Friday => chrono::Weekday::Fri,
            WeekDay::Saturday => chrono::Weekday::Sat,
        }
    }
}

impl From<chrono::Weekday> for WeekDay {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => WeekDay::Sunday,
            chrono::Weekday::Mon => WeekDay::Monday,
            chrono::Weekday::Tue => WeekDay::Tuesday,
            chrono::Weekday::Wed => WeekDay::Wednesday,
            chrono::Weekday::Thu => WeekDay::Thursday,
            chrono::Weekday::Fri => WeekDay::Friday,
            chrono::Weekday::Sat => WeekDay::Saturday,
        }
    }
}

impl ICalendarEntity for WeekDay {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        context(
            "WEEKDAY",
            alt((
                map(tag("SU"), |_| Self::Sunday),
                map(tag("MO"), |_| Self::Monday),
                map(tag("TU"), |_| Self::Tuesday),
                map(tag("WE"), |_| Self::Wednesday),
                map(tag("TH"), |_| Self::Thursday),
                map(tag("FR"), |_| Self::Friday),
                map(tag("SA"), |_| Self::Saturday),
            ))
        )(input)
    }

    fn render_ical(&self) -> String {
        match self {
            Self::Sunday => String::from("SU"),
            Self::Monday => String::from("MO"),
            Self::Tuesday => String::from("TU"),
            Self::Wednesday => String::from("WE"),
            Self::Thursday => String::from("TH"),
            Self::Friday => String::from("FR"),
            Self::Saturday => String::from("SA"),
        }
    }
}

impl_icalendar_entity_traits!(WeekDay);

/// RFC 7529 SKIP behaviour for generated dates that do not exist in the
/// current month (e.g. BYMONTHDAY=31 in February).
///
/// skip        = "OMIT" / "BACKWARD" / "FORWARD"
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Skip {
    Omit,
    Backward,
    Forward,
}

impl ICalendarEntity for Skip {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        context(
            "SKIP",
            alt((
                map(tag("OMIT"), |_| Self::Omit),
                map(tag("BACKWARD"), |_| Self::Backward),
                map(tag("FORWARD"), |_| Self::Forward),
            ))
        )(input)
    }

    fn render_ical(&self) -> String {
        match self {
            Self::Omit => String::from("OMIT"),
            Self::Backward => String::from("BACKWARD"),
            Self::Forward => String::from("FORWARD"),
        }
    }
}

impl_icalendar_entity_traits!(Skip);

/// RFC 7529 RSCALE calendar scale token, kept verbatim.
///
/// rscaleparam = "RSCALE" "=" rscale
/// rscale      = iana-token
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RScale(pub String);

impl RScale {
    pub fn is_gregorian(&self) -> bool {
        self.0.eq_ignore_ascii_case("GREGORIAN")
    }
}

impl ICalendarEntity for RScale {
    fn parse_ical(input: ParserInput) -> ParserResult<Self>
    where
        Self: Sized
    {
        rscale_value(input)
    }

    fn render_ical(&self) -> String {
        self.0.clone()
    }
}

impl_icalendar_entity_traits!(RScale);

/// recur           = recur-rule-part *( ";" recur-rule-part )
///                 ;
///                 ; The rule parts are not ordered in any
///                 ; particular sequence.
///                 ;
///                 ; The FREQ rule part is REQUIRED,
///                 ; but MUST NOT occur more than once.
///                 ;
///                 ; The UNTIL or COUNT rule parts are OPTIONAL,
///                 ; but they MUST NOT occur in the same 'recur'.
///                 ;
///                 ; The other rule parts are OPTIONAL,
///                 ; but MUST NOT occur more than once.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Recur {
    pub freq: Option<FreqParam>,
    pub until: Option<UntilParam>,
    pub count: Option<CountParam>,
    pub interval: Option<IntervalParam>,
    pub bysecond: Option<BysecondParam>,
    pub byminute: Option<ByminuteParam>,
    pub byhour: Option<ByhourParam>,
    pub byday: Option<BydayParam>,
    pub bymonthday: Option<BymonthdayParam>,
    pub byyearday: Option<ByyeardayParam>,
    pub byweekno: Option<ByweeknoParam>,
    pub bymonth: Option<BymonthParam>,
    pub bysetpos: Option<BysetposParam>,
    pub wkst: Option<WkstParam>,
    pub rscale: Option<RscaleParam>,
    pub skip: Option<SkipParam>,
    pub tzid: Option<TzidParam>,
}

impl ICalendarEntity for Recur {
    fn parse_ical(input: ParserInput) -> ParserResult<Self> {
        context(
            "RECUR",
            map_res(
                separated_list1(
                    semicolon,
                    RecurRulePart::parse_ical,
                ),
                |recur_rule_parts| -> Result<Recur, String> {
                    let mut recur = Recur::default();

                    for recur_rule_part in recur_rule_parts {
                        recur.insert(recur_rule_part);
                    }

                    recur.validate()?;

                    Ok(recur)
                }
            )
        )(input)
    }

    fn render_ical(&self) -> String {
        fn push_rendered_ical_if_present<T: ICalendarEntity>(property: &Option<T>, parts: &mut Vec<String>) {
            if let Some(property) = property {
                parts.push(property.render_ical());
            }
        }

        let mut parts: Vec<String> = Vec::new();

        push_rendered_ical_if_present(&self.rscale, &mut parts);
        push_rendered_ical_if_present(&self.freq, &mut parts);
        push_rendered_ical_if_present(&self.until, &mut parts);
        push_rendered_ical_if_present(&self.count, &mut parts);
        push_rendered_ical_if_present(&self.interval, &mut parts);
        push_rendered_ical_if_present(&self.bysecond, &mut parts);
        push_rendered_ical_if_present(&self.byminute, &mut parts);
        push_rendered_ical_if_present(&self.byhour, &mut parts);
        push_rendered_ical_if_present(&self.byday, &mut parts);
        push_rendered_ical_if_present(&self.bymonthday, &mut parts);
        push_rendered_ical_if_present(&self.byyearday, &mut parts);
        push_rendered_ical_if_present(&self.byweekno, &mut parts);
        push_rendered_ical_if_present(&self.bymonth, &mut parts);
        push_rendered_ical_if_present(&self.bysetpos, &mut parts);
        push_rendered_ical_if_present(&self.wkst, &mut parts);
        push_rendered_ical_if_present(&self.skip, &mut parts);
        push_rendered_ical_if_present(&self.tzid, &mut parts);

        parts.join(";")
    }

    /// Applies the RFC 5545 §3.3.10 / RFC 7529 §4.1 MUST and MUST NOT
    /// constraints that span rule parts. Per-entry value ranges are already
    /// enforced by the part parsers.
    fn validate(&self) -> Result<(), String> {
        let Some(FreqParam(freq)) = self.freq.as_ref() else {
            return Err(String::from("FREQ is required (RFC 5545 section 3.3.10)"));
        };

        if self.count.is_some() && self.until.is_some() {
            return Err(String::from("COUNT and UNTIL are mutually exclusive (RFC 5545 section 3.3.10)"));
        }

        if let Some(CountParam(count)) = self.count.as_ref() {
            if count.0 < 1 {
                return Err(format!("COUNT={} out of range: expected 1 or greater", count.0));
            }
        }

        if let Some(IntervalParam(interval)) = self.interval.as_ref() {
            if interval.0 < 1 {
                return Err(format!("INTERVAL={} out of range: expected 1 or greater", interval.0));
            }
        }

        if let Some(UntilParam(until)) = self.until.as_ref() {
            until.validate().map_err(|error| format!("UNTIL invalid: {error}"))?;
        }

        if self.byweekno.is_some() && !matches!(freq, Frequency::Yearly) {
            return Err(format!(
                "BYWEEKNO is only permitted when FREQ=YEARLY, not FREQ={} (RFC 5545 section 3.3.10)",
                freq.render_ical(),
            ));
        }

        if self.byyearday.is_some() && matches!(freq, Frequency::Daily | Frequency::Weekly | Frequency::Monthly) {
            return Err(format!(
                "BYYEARDAY is forbidden when FREQ={} (RFC 5545 section 3.3.10)",
                freq.render_ical(),
            ));
        }

        if self.bymonthday.is_some() && matches!(freq, Frequency::Weekly) {
            return Err(String::from("BYMONTHDAY is forbidden when FREQ=WEEKLY (RFC 5545 section 3.3.10)"));
        }

        let has_byday_ordinal =
            self.byday
                .as_ref()
                .is_some_and(|BydayParam(byday)| {
                    byday.iter().any(|WeekDayNum(ordinal, _weekday)| ordinal.is_some())
                });

        if has_byday_ordinal && !matches!(freq, Frequency::Monthly | Frequency::Yearly) {
            return Err(format!(
                "BYDAY entries may only carry an ordinal when FREQ=MONTHLY or FREQ=YEARLY, not FREQ={} (RFC 5545 section 3.3.10)",
                freq.render_ical(),
            ));
        }

        if has_byday_ordinal && matches!(freq, Frequency::Yearly) && self.byweekno.is_some() {
            return Err(String::from(
                "BYDAY entries must not carry an ordinal when FREQ=YEARLY is combined with BYWEEKNO (RFC 5545 section 3.3.10)",
            ));
        }

        if matches!(freq, Frequency::Yearly) && self.bymonth.is_some() && self.byyearday.is_some() {
            return Err(String::from(
                "BYMONTH and BYYEARDAY cannot be combined when FREQ=YEARLY",
            ));
        }

        if self.bysetpos.is_some() {
            let has_other_by_part = self.bysecond.is_some()
                || self.byminute.is_some()
                || self.byhour.is_some()
                || self.byday.is_some()
                || self.bymonthday.is_some()
                || self.byyearday.is_some()
                || self.byweekno.is_some()
                || self.bymonth.is_some();

            if !has_other_by_part {
                return Err(String::from(
                    "BYSETPOS requires at least one other BYxxx rule part (RFC 5545 section 3.3.10)",
                ));
            }
        }

        Ok(())
    }
}

impl Default for Recur {
    fn default() -> Self {
        Recur {
            freq: None,
            until: None,
            count: None,
            interval: None,
            bysecond: None,
            byminute: None,
            byhour: None,
            byday: None,
            bymonthday: None,
            byyearday: None,
            byweekno: None,
            bymonth: None,
            bysetpos: None,
            wkst: None,
            rscale: None,
            skip: None,
            tzid: None,
        }
    }
}

impl Recur {
    fn insert(&mut self, recur_rule_part: RecurRulePart) {
        match recur_rule_part {
            RecurRulePart::Freq(param) => self.freq = Some(param),
            RecurRulePart::Until(param) => self.until = Some(param),
            RecurRulePart::Count(param) => self.count = Some(param),
            RecurRulePart::Interval(param) => self.interval = Some(param),
            RecurRulePart::Bysecond(param) => self.bysecond = Some(param),
            RecurRulePart::Byminute(param) => self.byminute = Some(param),
            RecurRulePart::Byhour(param) => self.byhour = Some(param),
            RecurRulePart::Byday(param) => self.byday = Some(param),
            RecurRulePart::Bymonthday(param) => self.bymonthday = Some(param),
            RecurRulePart::Byyearday(param) => self.byyearday = Some(param),
            RecurRulePart::Byweekno(param) => self.byweekno = Some(param),
            RecurRulePart::Bymonth(param) => self.bymonth = Some(param),
            RecurRulePart::Bysetpos(param) => self.bysetpos = Some(param),
            RecurRulePart::Wkst(param) => self.wkst = Some(param),
            RecurRulePart::Rscale(param) => self.rscale = Some(param),
            RecurRulePart::Skip(param) => self.skip = Some(param),
            RecurRulePart::Tzid(param) => self.tzid = Some(param),
            RecurRulePart::Other => {}
        };
    }
}

impl_icalendar_entity_traits!(Recur);
