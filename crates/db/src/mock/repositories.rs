use async_trait::async_trait;
use barbershop_core::errors::BookingResult;
use barbershop_core::models::{
    appointment::{Appointment, AppointmentDetail, AppointmentStatus, NewBooking},
    catalog::{Day, ServiceType, SlotLabel},
    closure::ClosedDate,
    report::{AppointmentFilter, ServiceCount},
};
use barbershop_core::store::{CatalogStore, ClosureStore, ReservationStore};
use chrono::{NaiveDate, Weekday};
use mockall::mock;
use uuid::Uuid;

mock! {
    pub CatalogRepo {}

    #[async_trait]
    impl CatalogStore for CatalogRepo {
        async fn list_days(&self) -> BookingResult<Vec<Day>>;

        async fn day_for_weekday(&self, weekday: Weekday) -> BookingResult<Option<Day>>;

        async fn slots_for_weekday(&self, weekday: Weekday) -> BookingResult<Vec<SlotLabel>>;

        async fn list_services(&self) -> BookingResult<Vec<ServiceType>>;

        async fn get_service(&self, id: Uuid) -> BookingResult<Option<ServiceType>>;
    }
}

mock! {
    pub ClosureRepo {}

    #[async_trait]
    impl ClosureStore for ClosureRepo {
        async fn is_closed(&self, date: NaiveDate) -> BookingResult<bool>;

        async fn close_date(
            &self,
            date: NaiveDate,
            reason: Option<String>,
        ) -> BookingResult<ClosedDate>;

        async fn reopen_date(&self, date: NaiveDate) -> BookingResult<bool>;

        async fn list_closures(&self, from: NaiveDate) -> BookingResult<Vec<ClosedDate>>;
    }
}

mock! {
    pub ReservationRepo {}

    #[async_trait]
    impl ReservationStore for ReservationRepo {
        async fn occupied_slots(&self, date: NaiveDate) -> BookingResult<Vec<SlotLabel>>;

        async fn is_slot_taken(
            &self,
            date: NaiveDate,
            slot: SlotLabel,
            excluding: Option<Uuid>,
        ) -> BookingResult<bool>;

        async fn insert_booking(&self, booking: NewBooking) -> BookingResult<Appointment>;

        async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>>;

        async fn get_appointment_detail(
            &self,
            id: Uuid,
        ) -> BookingResult<Option<AppointmentDetail>>;

        async fn update_status(
            &self,
            id: Uuid,
            status: AppointmentStatus,
        ) -> BookingResult<Appointment>;

        async fn list_appointments(
            &self,
            filter: &AppointmentFilter,
        ) -> BookingResult<Vec<AppointmentDetail>>;

        async fn count_by_service(
            &self,
            filter: &AppointmentFilter,
        ) -> BookingResult<Vec<ServiceCount>>;
    }
}
